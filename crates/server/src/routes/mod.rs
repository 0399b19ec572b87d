use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::DeploymentImpl;

pub mod access;
pub mod admin;
pub mod assistant;
pub mod health;
pub mod highlights;
pub mod invites;
pub mod trade_ideas;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(access::router(&deployment))
        .merge(invites::router(&deployment))
        .merge(admin::router(&deployment))
        .merge(trade_ideas::router(&deployment))
        .merge(highlights::router(&deployment))
        .merge(assistant::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(deployment)
}
