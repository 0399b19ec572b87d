use anyhow::Context;
use clap::Parser;
use db::DBService;
use server::{DeploymentImpl, config::Config, routes};
use tracing_subscriber::{EnvFilter, prelude::*};

const DEFAULT_LOG_FILTER: &str = "info,server=debug,services=debug,db=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = Config::parse();
    let database_path = config.database_path();
    let db = DBService::new(&database_path)
        .await
        .with_context(|| format!("opening database at {}", database_path.display()))?;

    let llm = config.llm_client()?;
    if llm.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, AI summaries and AlphaBot are disabled");
    }

    let deployment = DeploymentImpl::new(db, llm);
    let app = routes::router(deployment);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("AlphaLink listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
