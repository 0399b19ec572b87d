use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    access::AccessError, assistant::AssistantError, community_wipe::WipeError,
    highlights::HighlightError, invites::InviteError, trade_ideas::TradeIdeaError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// Shown for any identity or storage failure; the cause only goes to the log
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Could not verify credentials.";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Invite(#[from] InviteError),
    #[error(transparent)]
    TradeIdea(#[from] TradeIdeaError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Wipe(#[from] WipeError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    #[error("Missing or invalid bearer token")]
    Unauthorized,
    #[error("Admin access required")]
    Forbidden,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Access(err) if err.is_connection_error() => {
                error!(error = %err, "Access backend failure");
                (StatusCode::SERVICE_UNAVAILABLE, CONNECTION_ERROR_MESSAGE.to_string())
            }
            ApiError::Access(err) => match err {
                AccessError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AccessError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "Not signed in".to_string())
                }
                AccessError::OnboardingIncomplete => (
                    StatusCode::FORBIDDEN,
                    "Complete your profile first".to_string(),
                ),
                AccessError::NoPendingGrant | AccessError::InvalidTransition { .. } => (
                    StatusCode::CONFLICT,
                    "Submit an access code first".to_string(),
                ),
                _ => (StatusCode::SERVICE_UNAVAILABLE, CONNECTION_ERROR_MESSAGE.to_string()),
            },
            ApiError::Invite(InviteError::NotFound) => {
                (StatusCode::NOT_FOUND, "Invite not found".to_string())
            }
            ApiError::TradeIdea(err) => match err {
                TradeIdeaError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                TradeIdeaError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                TradeIdeaError::NotFound => (StatusCode::NOT_FOUND, "Trade idea not found".to_string()),
                TradeIdeaError::SummaryUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "AI summaries are not configured".to_string())
                }
                TradeIdeaError::Summary(e) => {
                    error!(error = %e, "Trade summary failed");
                    (StatusCode::BAD_GATEWAY, "Could not generate the AI summary".to_string())
                }
                TradeIdeaError::Database(e) => {
                    error!(error = %e, "Trade idea query failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
                }
            },
            ApiError::Highlight(err) => match err {
                HighlightError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                HighlightError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                HighlightError::NotFound => (StatusCode::NOT_FOUND, "Highlight not found".to_string()),
                HighlightError::Database(e) => {
                    error!(error = %e, "Highlight query failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
                }
            },
            ApiError::Assistant(err) => match err {
                AssistantError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AssistantError::Unavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "AlphaBot is not configured".to_string())
                }
                AssistantError::Llm(e) => {
                    error!(error = %e, "AlphaBot request failed");
                    (StatusCode::BAD_GATEWAY, "AlphaBot is unavailable right now".to_string())
                }
            },
            ApiError::Wipe(WipeError::Forbidden) | ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, "Admin access required".to_string())
            }
            ApiError::JsonRejection(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Invite(InviteError::Database(e))
            | ApiError::Wipe(WipeError::Database(e))
            | ApiError::Database(e) => {
                error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = ApiResponse::<()>::error(&message);
        (status, Json(body)).into_response()
    }
}
