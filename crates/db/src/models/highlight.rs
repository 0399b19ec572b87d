use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::role::Role;

/// A posted performance win
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Highlight {
    pub id: Uuid,
    pub author_id: Uuid,
    pub role: Role, // author's role at posting time; admin wins show as verified
    pub title: String,
    pub ticker_or_underlying: String,
    pub return_pct: f64,
    pub date: String, // YYYY-MM-DD
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for posting a highlight
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateHighlight {
    pub title: String,
    pub ticker_or_underlying: String,
    pub return_pct: f64,
    pub date: String,
    #[serde(default)]
    pub description: String,
}

impl Highlight {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        author_id: Uuid,
        role: Role,
        data: &CreateHighlight,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Highlight>(
            r#"INSERT INTO highlights (id, author_id, role, title, ticker_or_underlying, return_pct,
                date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, author_id, role, title, ticker_or_underlying, return_pct, date,
                description, created_at"#,
        )
        .bind(id)
        .bind(author_id)
        .bind(role)
        .bind(&data.title)
        .bind(&data.ticker_or_underlying)
        .bind(data.return_pct)
        .bind(&data.date)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Highlight>(
            r#"SELECT id, author_id, role, title, ticker_or_underlying, return_pct, date,
                description, created_at
            FROM highlights
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Highlight>(
            r#"SELECT id, author_id, role, title, ticker_or_underlying, return_pct, date,
                description, created_at
            FROM highlights
            ORDER BY created_at DESC, rowid DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM highlights").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
