use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::invite::{CreateInvite, Invite, SetInviteStatus, UpdateInvite};
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{Admin, AppJson},
};

/// GET /api/invites
pub async fn list_invites(
    State(deployment): State<DeploymentImpl>,
    Admin(_admin): Admin,
) -> Result<ResponseJson<ApiResponse<Vec<Invite>>>, ApiError> {
    let invites = deployment.invites().list().await?;
    Ok(ResponseJson(ApiResponse::success(invites)))
}

/// POST /api/invites
pub async fn create_invite(
    State(deployment): State<DeploymentImpl>,
    Admin(admin): Admin,
    AppJson(payload): AppJson<CreateInvite>,
) -> Result<ResponseJson<ApiResponse<Invite>>, ApiError> {
    let invite = deployment.invites().create(&payload).await?;
    tracing::info!(admin_id = %admin.identity_id, invite_id = %invite.id, "Admin created invite");
    Ok(ResponseJson(ApiResponse::success(invite)))
}

/// PUT /api/invites/{invite_id}
pub async fn update_invite(
    State(deployment): State<DeploymentImpl>,
    Admin(_admin): Admin,
    Path(invite_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateInvite>,
) -> Result<ResponseJson<ApiResponse<Invite>>, ApiError> {
    let invite = deployment.invites().update(invite_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(invite)))
}

/// DELETE /api/invites/{invite_id}
pub async fn delete_invite(
    State(deployment): State<DeploymentImpl>,
    Admin(_admin): Admin,
    Path(invite_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.invites().delete(invite_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/invites/{invite_id}/toggle
pub async fn toggle_invite(
    State(deployment): State<DeploymentImpl>,
    Admin(_admin): Admin,
    Path(invite_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Invite>>, ApiError> {
    let invite = deployment.invites().toggle(invite_id).await?;
    Ok(ResponseJson(ApiResponse::success(invite)))
}

/// PUT /api/invites/{invite_id}/status
pub async fn set_invite_status(
    State(deployment): State<DeploymentImpl>,
    Admin(_admin): Admin,
    Path(invite_id): Path<Uuid>,
    AppJson(payload): AppJson<SetInviteStatus>,
) -> Result<ResponseJson<ApiResponse<Invite>>, ApiError> {
    let invite = deployment
        .invites()
        .set_status(invite_id, payload.status)
        .await?;
    Ok(ResponseJson(ApiResponse::success(invite)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/invites",
        Router::new()
            .route("/", get(list_invites).post(create_invite))
            .route("/{invite_id}", put(update_invite).delete(delete_invite))
            .route("/{invite_id}/toggle", post(toggle_invite))
            .route("/{invite_id}/status", put(set_invite_status)),
    )
}
