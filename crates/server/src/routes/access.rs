use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user_profile::UserProfile;
use services::services::access::{
    AccessState, CodeOutcome, ProfileSubmission, SessionView, SubmitCode,
};
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{AppJson, Bearer, MaybeBearer},
};

/// POST /api/access/code
/// A denied code is still a 200; the decision is in the body
pub async fn submit_code(
    State(deployment): State<DeploymentImpl>,
    MaybeBearer(token): MaybeBearer,
    AppJson(payload): AppJson<SubmitCode>,
) -> Result<ResponseJson<ApiResponse<CodeOutcome>>, ApiError> {
    let outcome = deployment
        .access()
        .submit_code(token.as_deref(), &payload.code)
        .await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

/// POST /api/access/profile
pub async fn complete_profile(
    State(deployment): State<DeploymentImpl>,
    Bearer(token): Bearer,
    AppJson(payload): AppJson<ProfileSubmission>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, ApiError> {
    let profile = deployment
        .access()
        .complete_profile(&token, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// POST /api/access/logout
pub async fn logout(
    State(deployment): State<DeploymentImpl>,
    MaybeBearer(token): MaybeBearer,
) -> ResponseJson<ApiResponse<AccessState>> {
    let state = deployment.access().logout(token.as_deref()).await;
    ResponseJson(ApiResponse::success(state))
}

/// GET /api/access/me
pub async fn me(
    State(deployment): State<DeploymentImpl>,
    Bearer(token): Bearer,
) -> Result<ResponseJson<ApiResponse<SessionView>>, ApiError> {
    let view = deployment.access().current(&token).await?;
    Ok(ResponseJson(ApiResponse::success(view)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/access",
        Router::new()
            .route("/code", post(submit_code))
            .route("/profile", post(complete_profile))
            .route("/logout", post(logout))
            .route("/me", get(me)),
    )
}
