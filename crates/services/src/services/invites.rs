use db::models::invite::{CreateInvite, Invite, InviteStatus, UpdateInvite};
use rand::{Rng, distributions::Alphanumeric};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_INVITE_LABEL: &str = "General";
const CODE_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invite not found")]
    NotFound,
}

/// 8 random uppercase alphanumerics
pub fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

fn label_or_default(label: Option<&str>) -> &str {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label,
        _ => DEFAULT_INVITE_LABEL,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Admin-side invite management. Callers must already be authorized.
#[derive(Clone)]
pub struct InviteService {
    pool: SqlitePool,
}

impl InviteService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateInvite) -> Result<Invite, InviteError> {
        let code = generate_invite_code();
        let invite = Invite::create(
            &self.pool,
            Uuid::new_v4(),
            &code,
            label_or_default(data.label.as_deref()),
            non_blank(data.recipient.as_deref()),
            data.role.unwrap_or_default(),
            data.tier,
        )
        .await?;

        info!(
            invite_id = %invite.id,
            role = %invite.granted_role(),
            "Invite created"
        );
        Ok(invite)
    }

    pub async fn list(&self) -> Result<Vec<Invite>, InviteError> {
        Ok(Invite::find_all(&self.pool).await?)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Invite, InviteError> {
        let invite = Invite::find_by_id(&self.pool, id)
            .await?
            .ok_or(InviteError::NotFound)?;
        self.set_status(id, invite.status.toggled()).await
    }

    pub async fn set_status(&self, id: Uuid, status: InviteStatus) -> Result<Invite, InviteError> {
        let invite = Invite::update_status(&self.pool, id, status)
            .await?
            .ok_or(InviteError::NotFound)?;
        info!(invite_id = %id, status = %invite.status, "Invite status changed");
        Ok(invite)
    }

    /// Absent fields keep their stored value. A blank label falls back to
    /// the default and a blank recipient clears it.
    pub async fn update(&self, id: Uuid, data: &UpdateInvite) -> Result<Invite, InviteError> {
        let existing = Invite::find_by_id(&self.pool, id)
            .await?
            .ok_or(InviteError::NotFound)?;

        let label = match data.label.as_deref() {
            Some(label) => label_or_default(Some(label)).to_string(),
            None => existing
                .label
                .unwrap_or_else(|| DEFAULT_INVITE_LABEL.to_string()),
        };
        let recipient = match data.recipient.as_deref() {
            Some(recipient) => non_blank(Some(recipient)).map(str::to_string),
            None => existing.recipient,
        };
        let tier = data.tier.or(existing.tier);

        let invite = Invite::update_details(&self.pool, id, &label, recipient.as_deref(), tier)
            .await?
            .ok_or(InviteError::NotFound)?;
        info!(invite_id = %id, "Invite updated");
        Ok(invite)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), InviteError> {
        let rows = Invite::delete(&self.pool, id).await?;
        if rows == 0 {
            return Err(InviteError::NotFound);
        }
        info!(invite_id = %id, "Invite deleted");
        Ok(())
    }
}
