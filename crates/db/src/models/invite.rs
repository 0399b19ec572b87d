use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::role::{MemberTier, Role};

/// Whether an invite can currently be redeemed
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InviteStatus {
    #[default]
    Active,
    Disabled,
}

impl InviteStatus {
    pub fn toggled(self) -> Self {
        match self {
            InviteStatus::Active => InviteStatus::Disabled,
            InviteStatus::Disabled => InviteStatus::Active,
        }
    }
}

/// A redeemable access grant
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Invite {
    pub id: Uuid,
    pub code: String,
    pub label: Option<String>,
    pub recipient: Option<String>,
    pub role: Option<Role>, // NULL is read as member
    pub tier: Option<MemberTier>,
    pub status: InviteStatus,
    pub used_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Role handed out on redemption
    pub fn granted_role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

/// Request body for creating an invite
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateInvite {
    pub label: Option<String>,
    pub recipient: Option<String>,
    pub role: Option<Role>,
    pub tier: Option<MemberTier>,
}

/// Request body for editing an invite; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateInvite {
    pub label: Option<String>,
    pub recipient: Option<String>,
    pub tier: Option<MemberTier>,
}

/// Request body for setting an invite status explicitly
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetInviteStatus {
    pub status: InviteStatus,
}

impl Invite {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        code: &str,
        label: &str,
        recipient: Option<&str>,
        role: Role,
        tier: Option<MemberTier>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"INSERT INTO invites (id, code, label, recipient, role, tier, status, used_count)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', 0)
            RETURNING id, code, label, recipient, role, tier, status, used_count, created_at"#,
        )
        .bind(id)
        .bind(code)
        .bind(label)
        .bind(recipient)
        .bind(role)
        .bind(tier)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"SELECT id, code, label, recipient, role, tier, status, used_count, created_at
            FROM invites
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All invites, newest first
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"SELECT id, code, label, recipient, role, tier, status, used_count, created_at
            FROM invites
            ORDER BY created_at DESC, rowid DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// First active invite carrying `code`. Codes are not unique, so the
    /// oldest matching invite wins.
    pub async fn find_active_by_code(
        pool: &SqlitePool,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"SELECT id, code, label, recipient, role, tier, status, used_count, created_at
            FROM invites
            WHERE code = $1 AND status = 'active'
            ORDER BY created_at ASC, rowid ASC
            LIMIT 1"#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"UPDATE invites
            SET status = $2
            WHERE id = $1
            RETURNING id, code, label, recipient, role, tier, status, used_count, created_at"#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_details(
        pool: &SqlitePool,
        id: Uuid,
        label: &str,
        recipient: Option<&str>,
        tier: Option<MemberTier>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Invite>(
            r#"UPDATE invites
            SET label = $2,
                recipient = $3,
                tier = $4
            WHERE id = $1
            RETURNING id, code, label, recipient, role, tier, status, used_count, created_at"#,
        )
        .bind(id)
        .bind(label)
        .bind(recipient)
        .bind(tier)
        .fetch_optional(pool)
        .await
    }

    pub async fn increment_used_count(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE invites SET used_count = used_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invites")
            .fetch_one(pool)
            .await
    }
}
