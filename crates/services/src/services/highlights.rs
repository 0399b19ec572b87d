use db::models::highlight::{CreateHighlight, Highlight};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{access::Actor, trade_ideas::is_iso_date};

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("not allowed to remove this highlight")]
    Forbidden,
    #[error("highlight not found")]
    NotFound,
}

fn normalize_highlight(mut data: CreateHighlight) -> Result<CreateHighlight, HighlightError> {
    data.title = data.title.trim().to_string();
    data.ticker_or_underlying = data.ticker_or_underlying.trim().to_uppercase();
    data.date = data.date.trim().to_string();
    data.description = data.description.trim().to_string();

    if data.title.is_empty() {
        return Err(HighlightError::Validation("Title is required".to_string()));
    }
    if data.ticker_or_underlying.is_empty() {
        return Err(HighlightError::Validation("Ticker is required".to_string()));
    }
    if !data.return_pct.is_finite() {
        return Err(HighlightError::Validation("Return must be a number".to_string()));
    }
    if !is_iso_date(&data.date) {
        return Err(HighlightError::Validation(
            "Date must be a YYYY-MM-DD date".to_string(),
        ));
    }
    Ok(data)
}

#[derive(Clone)]
pub struct HighlightService {
    pool: SqlitePool,
}

impl HighlightService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Any active member may post; the author's role is stored with the win
    pub async fn post(&self, actor: &Actor, data: CreateHighlight) -> Result<Highlight, HighlightError> {
        let data = normalize_highlight(data)?;
        let highlight =
            Highlight::create(&self.pool, Uuid::new_v4(), actor.identity_id, actor.role, &data)
                .await?;
        info!(
            highlight_id = %highlight.id,
            role = %highlight.role,
            "Highlight posted"
        );
        Ok(highlight)
    }

    pub async fn list(&self) -> Result<Vec<Highlight>, HighlightError> {
        Ok(Highlight::find_all(&self.pool).await?)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), HighlightError> {
        let highlight = Highlight::find_by_id(&self.pool, id)
            .await?
            .ok_or(HighlightError::NotFound)?;
        if !actor.can_manage(highlight.author_id) {
            return Err(HighlightError::Forbidden);
        }
        Highlight::delete(&self.pool, id).await?;
        info!(highlight_id = %id, "Highlight deleted");
        Ok(())
    }
}
