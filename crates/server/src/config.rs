use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use services::services::llm_client::{LlmClient, LlmError};

#[derive(Debug, Clone, Parser)]
#[command(name = "alphalink", version, about = "AlphaLink community server")]
pub struct Config {
    #[arg(long, env = "ALPHALINK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "ALPHALINK_PORT", default_value_t = 3001)]
    pub port: u16,

    /// SQLite file; defaults to the platform data directory
    #[arg(long, env = "ALPHALINK_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Without a key the AI features answer 503
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[arg(long, env = "ALPHALINK_LLM_MODEL")]
    pub llm_model: Option<String>,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::assets::default_database_path)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn llm_client(&self) -> Result<Option<LlmClient>, LlmError> {
        match self.anthropic_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                LlmClient::new(key.to_string(), self.llm_model.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }
}
