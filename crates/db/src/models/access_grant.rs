use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::role::{MemberTier, Role};

/// Where a granted session stands in the onboarding flow
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "grant_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GrantState {
    Onboarding,
    Active,
}

/// The role a session earned by redeeming a code. Removed with its session.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AccessGrant {
    pub session_id: Uuid,
    pub role: Role,
    pub tier: Option<MemberTier>,
    pub invite_id: Option<Uuid>, // None for the bootstrap code
    pub access_code: String,
    pub state: GrantState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpsertAccessGrant<'a> {
    pub session_id: Uuid,
    pub role: Role,
    pub tier: Option<MemberTier>,
    pub invite_id: Option<Uuid>,
    pub access_code: &'a str,
    pub state: GrantState,
}

impl AccessGrant {
    pub async fn find_by_session_id(
        pool: &SqlitePool,
        session_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AccessGrant>(
            r#"SELECT session_id, role, tier, invite_id, access_code, state, created_at, updated_at
            FROM access_grants
            WHERE session_id = $1"#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
    }

    /// A later redemption on the same session replaces the earlier grant
    pub async fn upsert(
        pool: &SqlitePool,
        data: &UpsertAccessGrant<'_>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AccessGrant>(
            r#"INSERT INTO access_grants (session_id, role, tier, invite_id, access_code, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(session_id) DO UPDATE SET
                role = excluded.role,
                tier = excluded.tier,
                invite_id = excluded.invite_id,
                access_code = excluded.access_code,
                state = excluded.state,
                updated_at = datetime('now', 'subsec')
            RETURNING session_id, role, tier, invite_id, access_code, state, created_at, updated_at"#,
        )
        .bind(data.session_id)
        .bind(data.role)
        .bind(data.tier)
        .bind(data.invite_id)
        .bind(data.access_code)
        .bind(data.state)
        .fetch_one(pool)
        .await
    }

    pub async fn update_state(
        pool: &SqlitePool,
        session_id: Uuid,
        state: GrantState,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE access_grants
            SET state = $2,
                updated_at = datetime('now', 'subsec')
            WHERE session_id = $1"#,
        )
        .bind(session_id)
        .bind(state)
        .execute(pool)
        .await?;
        Ok(())
    }
}
