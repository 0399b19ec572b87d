//! Access-code validation: bootstrap constant first, then active invites.

use db::models::{
    invite::Invite,
    role::{MemberTier, Role},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Always grants administrator access, whatever the invites table holds.
pub const ADMIN_BOOTSTRAP_CODE: &str = "ALPHALINK_ADMIN_888";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Role granted by a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: Role,
    pub tier: Option<MemberTier>,
    /// The invite that matched; None when the bootstrap code was used
    pub invite_id: Option<Uuid>,
    /// Normalized code as submitted
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialDecision {
    Granted(RoleGrant),
    Denied,
}

impl CredentialDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, CredentialDecision::Granted(_))
    }
}

/// Trim, then uppercase the whole string
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub struct CredentialValidator {
    pool: SqlitePool,
}

impl CredentialValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a submitted code. Read-only: nothing is written whatever the
    /// outcome.
    pub async fn validate(&self, raw_code: &str) -> Result<CredentialDecision, CredentialError> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Ok(CredentialDecision::Denied);
        }

        if code == ADMIN_BOOTSTRAP_CODE {
            debug!("Access code matched bootstrap constant");
            return Ok(CredentialDecision::Granted(RoleGrant {
                role: Role::Admin,
                tier: None,
                invite_id: None,
                code,
            }));
        }

        match Invite::find_active_by_code(&self.pool, &code).await? {
            Some(invite) => {
                debug!(invite_id = %invite.id, "Access code matched active invite");
                Ok(CredentialDecision::Granted(RoleGrant {
                    role: invite.granted_role(),
                    tier: invite.tier,
                    invite_id: Some(invite.id),
                    code,
                }))
            }
            None => Ok(CredentialDecision::Denied),
        }
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::invite::{Invite, InviteStatus},
    };

    use super::*;

    async fn setup() -> (DBService, CredentialValidator) {
        let db = DBService::new_in_memory().await.unwrap();
        let validator = CredentialValidator::new(db.pool.clone());
        (db, validator)
    }

    async fn invite(db: &DBService, code: &str, role: Role, tier: Option<MemberTier>) -> Invite {
        Invite::create(&db.pool, Uuid::new_v4(), code, "General", None, role, tier)
            .await
            .unwrap()
    }

    #[test]
    fn normalization_trims_and_uppercases() {
        assert_eq!(normalize_code("  alphalink_admin_888  "), "ALPHALINK_ADMIN_888");
        assert_eq!(normalize_code("\tvip2024\n"), "VIP2024");
    }

    #[tokio::test]
    async fn padded_lowercase_bootstrap_code_grants_admin() {
        let (_db, validator) = setup().await;
        let decision = validator.validate("  alphalink_admin_888  ").await.unwrap();
        assert_eq!(
            decision,
            CredentialDecision::Granted(RoleGrant {
                role: Role::Admin,
                tier: None,
                invite_id: None,
                code: "ALPHALINK_ADMIN_888".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn bootstrap_code_ignores_invites() {
        let (db, validator) = setup().await;
        let shadow = invite(&db, ADMIN_BOOTSTRAP_CODE, Role::Member, None).await;
        Invite::update_status(&db.pool, shadow.id, InviteStatus::Disabled)
            .await
            .unwrap();

        let decision = validator.validate(ADMIN_BOOTSTRAP_CODE).await.unwrap();
        match decision {
            CredentialDecision::Granted(grant) => {
                assert_eq!(grant.role, Role::Admin);
                assert_eq!(grant.invite_id, None);
            }
            CredentialDecision::Denied => panic!("bootstrap code was denied"),
        }
    }

    #[tokio::test]
    async fn lowercase_code_matches_active_member_invite() {
        let (db, validator) = setup().await;
        let vip = invite(&db, "VIP2024", Role::Member, Some(MemberTier::Vip)).await;

        let decision = validator.validate("vip2024").await.unwrap();
        assert_eq!(
            decision,
            CredentialDecision::Granted(RoleGrant {
                role: Role::Member,
                tier: Some(MemberTier::Vip),
                invite_id: Some(vip.id),
                code: "VIP2024".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn admin_invite_grants_admin() {
        let (db, validator) = setup().await;
        invite(&db, "BOSS", Role::Admin, None).await;
        let decision = validator.validate("boss").await.unwrap();
        assert!(matches!(
            decision,
            CredentialDecision::Granted(RoleGrant { role: Role::Admin, .. })
        ));
    }

    #[tokio::test]
    async fn disabled_invite_is_denied_on_exact_match() {
        let (db, validator) = setup().await;
        let old = invite(&db, "OLD123", Role::Member, None).await;
        Invite::update_status(&db.pool, old.id, InviteStatus::Disabled)
            .await
            .unwrap();

        assert_eq!(validator.validate("OLD123").await.unwrap(), CredentialDecision::Denied);
    }

    #[tokio::test]
    async fn unknown_code_is_denied_without_writes() {
        let (db, validator) = setup().await;
        assert_eq!(validator.validate("RANDOMXYZ").await.unwrap(), CredentialDecision::Denied);
        assert_eq!(validator.validate("   ").await.unwrap(), CredentialDecision::Denied);
        assert_eq!(Invite::count(&db.pool).await.unwrap(), 0);
    }
}
