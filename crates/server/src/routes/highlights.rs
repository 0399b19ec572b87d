use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::highlight::{CreateHighlight, Highlight};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{AppJson, Member},
};

/// GET /api/highlights
pub async fn list_highlights(
    State(deployment): State<DeploymentImpl>,
    Member(_member): Member,
) -> Result<ResponseJson<ApiResponse<Vec<Highlight>>>, ApiError> {
    let highlights = deployment.highlights().list().await?;
    Ok(ResponseJson(ApiResponse::success(highlights)))
}

/// POST /api/highlights
pub async fn create_highlight(
    State(deployment): State<DeploymentImpl>,
    Member(actor): Member,
    AppJson(payload): AppJson<CreateHighlight>,
) -> Result<ResponseJson<ApiResponse<Highlight>>, ApiError> {
    let highlight = deployment.highlights().post(&actor, payload).await?;
    Ok(ResponseJson(ApiResponse::success(highlight)))
}

/// DELETE /api/highlights/{highlight_id}
pub async fn delete_highlight(
    State(deployment): State<DeploymentImpl>,
    Member(actor): Member,
    Path(highlight_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.highlights().delete(&actor, highlight_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/highlights",
        Router::new()
            .route("/", get(list_highlights).post(create_highlight))
            .route("/{highlight_id}", delete(delete_highlight)),
    )
}
