//! AlphaBot research-assistant chat.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use ts_rs::TS;

use super::{
    llm_client::{LlmClient, LlmError},
    trade_summary::{ALPHABOT_SYSTEM_PROMPT, DISCLAIMER},
};

const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("AI assistant is not configured")]
    Unavailable,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatReply {
    pub response: String,
}

pub fn system_prompt() -> String {
    format!(
        "{}\nAlways include the disclaimer: \"{}\" at the end of your response.",
        ALPHABOT_SYSTEM_PROMPT, DISCLAIMER
    )
}

/// Append the disclaimer when the model left it out
pub fn ensure_disclaimer(reply: &str) -> String {
    let reply = reply.trim_end();
    if reply.contains(DISCLAIMER) {
        reply.to_string()
    } else {
        format!("{}\n\n{}", reply, DISCLAIMER)
    }
}

#[derive(Clone)]
pub struct AssistantService {
    client: Option<LlmClient>,
}

impl AssistantService {
    pub fn new(client: Option<LlmClient>) -> Self {
        Self { client }
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AssistantError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AssistantError::Validation("Message is required".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AssistantError::Validation(format!(
                "Message is limited to {} characters",
                MAX_MESSAGE_CHARS
            )));
        }
        let client = self.client.as_ref().ok_or(AssistantError::Unavailable)?;

        debug!(chars = message.len(), "Forwarding chat message");
        let system = system_prompt();
        let reply = client.ask(Some(system.as_str()), message).await?;
        Ok(ChatReply {
            response: ensure_disclaimer(&reply),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclaimer_is_appended_once() {
        let reply = ensure_disclaimer("Theta decay accelerates near expiry.\n");
        assert!(reply.ends_with(DISCLAIMER));
        assert_eq!(ensure_disclaimer(&reply), reply);
    }

    #[test]
    fn system_prompt_demands_disclaimer() {
        let prompt = system_prompt();
        assert!(prompt.starts_with("You are AlphaBot."));
        assert!(prompt.contains(DISCLAIMER));
    }

    #[tokio::test]
    async fn unconfigured_assistant_is_unavailable() {
        let service = AssistantService::new(None);
        let err = service
            .chat(&ChatRequest {
                message: "Is TSLA a buy?".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Unavailable));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let service = AssistantService::new(None);
        let err = service
            .chat(&ChatRequest {
                message: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Validation(_)));
    }
}
