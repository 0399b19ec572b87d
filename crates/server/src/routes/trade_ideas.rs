use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::trade_idea::{CreateTradeIdea, TradeIdeaView};
use serde::Serialize;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{AppJson, Member},
};

#[derive(Debug, Serialize)]
pub struct LikeCount {
    pub like_count: i64,
}

/// GET /api/trade-ideas
pub async fn list_trade_ideas(
    State(deployment): State<DeploymentImpl>,
    Member(_member): Member,
) -> Result<ResponseJson<ApiResponse<Vec<TradeIdeaView>>>, ApiError> {
    let ideas = deployment.trade_ideas().list().await?;
    Ok(ResponseJson(ApiResponse::success(ideas)))
}

/// POST /api/trade-ideas
/// Admins only; the service enforces it against the stored role
pub async fn create_trade_idea(
    State(deployment): State<DeploymentImpl>,
    Member(actor): Member,
    AppJson(payload): AppJson<CreateTradeIdea>,
) -> Result<ResponseJson<ApiResponse<TradeIdeaView>>, ApiError> {
    let idea = deployment.trade_ideas().post(&actor, payload).await?;
    Ok(ResponseJson(ApiResponse::success(idea)))
}

/// POST /api/trade-ideas/{idea_id}/like
pub async fn like_trade_idea(
    State(deployment): State<DeploymentImpl>,
    Member(_member): Member,
    Path(idea_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<LikeCount>>, ApiError> {
    let like_count = deployment.trade_ideas().like(idea_id).await?;
    Ok(ResponseJson(ApiResponse::success(LikeCount { like_count })))
}

/// DELETE /api/trade-ideas/{idea_id}
pub async fn delete_trade_idea(
    State(deployment): State<DeploymentImpl>,
    Member(actor): Member,
    Path(idea_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.trade_ideas().delete(&actor, idea_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/trade-ideas",
        Router::new()
            .route("/", get(list_trade_ideas).post(create_trade_idea))
            .route("/{idea_id}", delete(delete_trade_idea))
            .route("/{idea_id}/like", post(like_trade_idea)),
    )
}
