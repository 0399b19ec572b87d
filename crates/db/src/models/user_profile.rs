use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::role::{MemberTier, Role};

/// How a member prefers to be reached
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "contact_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContactType {
    #[default]
    Email,
    Other,
}

/// Durable identity record bound to one invite redemption
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct UserProfile {
    pub uid: Uuid,
    pub role: Role,
    pub tier: Option<MemberTier>,
    pub display_name: String,
    pub contact_type: ContactType,
    pub contact_info: String,
    pub access_code: String, // raw redeemed code, uppercased
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Onboarding is finished once a display name is stored
    pub fn is_complete(&self) -> bool {
        !self.display_name.is_empty()
    }
}

/// Fields written by an upsert
#[derive(Debug, Clone)]
pub struct UpsertUserProfile<'a> {
    pub uid: Uuid,
    pub role: Role,
    pub tier: Option<MemberTier>,
    pub display_name: &'a str,
    pub contact_type: ContactType,
    pub contact_info: &'a str,
    pub access_code: &'a str,
}

impl UserProfile {
    pub async fn find_by_uid(pool: &SqlitePool, uid: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT uid, role, tier, display_name, contact_type, contact_info, access_code,
                created_at, updated_at
            FROM user_profiles
            WHERE uid = $1"#,
        )
        .bind(uid)
        .fetch_optional(pool)
        .await
    }

    /// Insert or merge into the profile keyed by `uid`. `created_at` survives
    /// an update and a missing tier keeps the stored one.
    pub async fn upsert(
        pool: &SqlitePool,
        data: &UpsertUserProfile<'_>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"INSERT INTO user_profiles
                (uid, role, tier, display_name, contact_type, contact_info, access_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(uid) DO UPDATE SET
                role = excluded.role,
                tier = COALESCE(excluded.tier, user_profiles.tier),
                display_name = excluded.display_name,
                contact_type = excluded.contact_type,
                contact_info = excluded.contact_info,
                access_code = excluded.access_code,
                updated_at = datetime('now', 'subsec')
            RETURNING uid, role, tier, display_name, contact_type, contact_info, access_code,
                created_at, updated_at"#,
        )
        .bind(data.uid)
        .bind(data.role)
        .bind(data.tier)
        .bind(data.display_name)
        .bind(data.contact_type)
        .bind(data.contact_info)
        .bind(data.access_code)
        .fetch_one(pool)
        .await
    }

    /// Store the first completed profile for `uid`. Yields `None` when the
    /// stored profile already has a display name, so only one writer ever
    /// sees the incomplete to complete transition.
    pub async fn complete_first(
        pool: &SqlitePool,
        data: &UpsertUserProfile<'_>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"INSERT INTO user_profiles
                (uid, role, tier, display_name, contact_type, contact_info, access_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(uid) DO UPDATE SET
                role = excluded.role,
                tier = COALESCE(excluded.tier, user_profiles.tier),
                display_name = excluded.display_name,
                contact_type = excluded.contact_type,
                contact_info = excluded.contact_info,
                access_code = excluded.access_code,
                updated_at = datetime('now', 'subsec')
            WHERE user_profiles.display_name = ''
            RETURNING uid, role, tier, display_name, contact_type, contact_info, access_code,
                created_at, updated_at"#,
        )
        .bind(data.uid)
        .bind(data.role)
        .bind(data.tier)
        .bind(data.display_name)
        .bind(data.contact_type)
        .bind(data.contact_info)
        .bind(data.access_code)
        .fetch_optional(pool)
        .await
    }

    /// Edit the member-facing fields only. Role, tier and redeemed code stay
    /// as stored.
    pub async fn update_details(
        pool: &SqlitePool,
        uid: Uuid,
        display_name: &str,
        contact_type: ContactType,
        contact_info: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"UPDATE user_profiles
            SET display_name = $2,
                contact_type = $3,
                contact_info = $4,
                updated_at = datetime('now', 'subsec')
            WHERE uid = $1
            RETURNING uid, role, tier, display_name, contact_type, contact_info, access_code,
                created_at, updated_at"#,
        )
        .bind(uid)
        .bind(display_name)
        .bind(contact_type)
        .bind(contact_info)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_all_except(pool: &SqlitePool, uid: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE uid != $1")
            .bind(uid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(pool)
            .await
    }
}
