use db::models::{
    highlight::Highlight, session::Session, trade_idea::TradeIdea, user_profile::UserProfile,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

use super::access::Actor;

#[derive(Debug, Error)]
pub enum WipeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("only admins can wipe community data")]
    Forbidden,
}

/// Rows removed by a wipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct WipeReport {
    pub trade_ideas: u64,
    pub highlights: u64,
    pub profiles: u64,
    pub sessions: u64,
}

/// Clears community content and every other member, keeping the calling
/// admin signed in. Invites are left alone.
pub async fn wipe_community(pool: &SqlitePool, actor: &Actor) -> Result<WipeReport, WipeError> {
    if !actor.is_admin() {
        return Err(WipeError::Forbidden);
    }

    let report = WipeReport {
        trade_ideas: TradeIdea::delete_all(pool).await?,
        highlights: Highlight::delete_all(pool).await?,
        profiles: UserProfile::delete_all_except(pool, actor.identity_id).await?,
        sessions: Session::delete_all_except(pool, actor.session_id).await?,
    };

    warn!(
        admin_id = %actor.identity_id,
        trade_ideas = report.trade_ideas,
        highlights = report.highlights,
        profiles = report.profiles,
        sessions = report.sessions,
        "Community data wiped"
    );
    Ok(report)
}
