use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use services::services::community_wipe::{WipeReport, wipe_community};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, middleware::Admin};

/// POST /api/admin/wipe
/// Removes all community content and every other member
pub async fn wipe(
    State(deployment): State<DeploymentImpl>,
    Admin(admin): Admin,
) -> Result<ResponseJson<ApiResponse<WipeReport>>, ApiError> {
    let report = wipe_community(&deployment.db().pool, &admin).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/admin/wipe", post(wipe))
}
