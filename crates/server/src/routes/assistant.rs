use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use services::services::assistant::{ChatReply, ChatRequest};
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{AppJson, Member},
};

/// POST /api/assistant/chat
pub async fn chat(
    State(deployment): State<DeploymentImpl>,
    Member(actor): Member,
    AppJson(payload): AppJson<ChatRequest>,
) -> Result<ResponseJson<ApiResponse<ChatReply>>, ApiError> {
    tracing::debug!(identity_id = %actor.identity_id, "AlphaBot chat");
    let reply = deployment.assistant().chat(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(reply)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/assistant/chat", post(chat))
}
