//! Invite redemption: code validation, anonymous identity, role grant and
//! profile completion.

use std::sync::Arc;

use db::models::{
    access_grant::{AccessGrant, GrantState, UpsertAccessGrant},
    invite::Invite,
    role::{MemberTier, Role},
    user_profile::{ContactType, UpsertUserProfile, UserProfile},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    credential::{CredentialDecision, CredentialError, CredentialValidator, RoleGrant},
    identity::{IdentityError, IdentityProvider, SignedIn},
};

pub const ADMIN_DISPLAY_NAME: &str = "Administrator";
pub const ADMIN_CONTACT_PLACEHOLDER: &str = "Unassigned";
pub const CONTACT_PLACEHOLDER: &str = "Unknown";

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("credential lookup failed: {0}")]
    Credential(#[from] CredentialError),
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),
    #[error("{0}")]
    Validation(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("onboarding not complete")]
    OnboardingIncomplete,
    #[error("no access code redeemed for this session")]
    NoPendingGrant,
    #[error("cannot apply {event} in state {state}")]
    InvalidTransition { state: AccessState, event: AccessEvent },
}

impl AccessError {
    /// Failures talking to the identity provider or the store. These all
    /// surface to users as one generic connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AccessError::Database(_) | AccessError::Credential(_) | AccessError::Identity(_)
        )
    }
}

/// Where a caller stands in the access flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccessState {
    Unauthenticated,
    AwaitingCode,
    ValidatingCode,
    Onboarding,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AccessEvent {
    OpenLanding,
    SubmitCode,
    Deny,
    ProvisionAdmin,
    Resume,
    RequireOnboarding,
    CompleteProfile,
    Logout,
}

impl AccessState {
    pub fn next(self, event: AccessEvent) -> Result<AccessState, AccessError> {
        use AccessEvent as E;
        use AccessState as S;

        let next = match (self, event) {
            (_, E::Logout) => S::Unauthenticated,
            (S::Unauthenticated, E::OpenLanding) => S::AwaitingCode,
            (S::AwaitingCode, E::SubmitCode) => S::ValidatingCode,
            (S::ValidatingCode, E::Deny) => S::AwaitingCode,
            (S::ValidatingCode, E::ProvisionAdmin | E::Resume) => S::Active,
            (S::ValidatingCode, E::RequireOnboarding) => S::Onboarding,
            (S::Onboarding | S::Active, E::CompleteProfile) => S::Active,
            (state, event) => return Err(AccessError::InvalidTransition { state, event }),
        };
        Ok(next)
    }
}

impl From<GrantState> for AccessState {
    fn from(state: GrantState) -> Self {
        match state {
            GrantState::Onboarding => AccessState::Onboarding,
            GrantState::Active => AccessState::Active,
        }
    }
}

/// Answer to a code submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeDecision {
    GrantedAdmin,
    GrantedMember,
    Denied,
}

impl From<Role> for CodeDecision {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => CodeDecision::GrantedAdmin,
            Role::Member => CodeDecision::GrantedMember,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CodeOutcome {
    pub decision: CodeDecision,
    pub state: AccessState,
    /// Bearer token for the granted session
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
    /// True when an existing complete profile was picked up unchanged
    pub resumed: bool,
}

/// Request body for submitting an access code
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SubmitCode {
    pub code: String,
}

/// Request body for the onboarding form
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProfileSubmission {
    pub display_name: String,
    #[serde(default)]
    pub contact_type: ContactType,
    #[serde(default)]
    pub contact_info: String,
}

/// Current session as seen by the client
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SessionView {
    pub state: AccessState,
    pub role: Option<Role>,
    pub tier: Option<MemberTier>,
    pub profile: Option<UserProfile>,
}

/// A signed-in caller with a complete profile
#[derive(Debug, Clone)]
pub struct Actor {
    pub session_id: Uuid,
    pub identity_id: Uuid,
    /// Read from the stored profile, not from the client
    pub role: Role,
    pub display_name: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins may manage anything; members only what they authored
    pub fn can_manage(&self, author_id: Uuid) -> bool {
        self.is_admin() || self.identity_id == author_id
    }
}

#[derive(Clone)]
pub struct AccessService {
    pool: SqlitePool,
    identity: Arc<dyn IdentityProvider>,
}

impl AccessService {
    pub fn new(pool: SqlitePool, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { pool, identity }
    }

    /// Validate `raw_code` and bind the grant to an anonymous identity,
    /// reusing the one behind `existing_token` when it is still signed in.
    pub async fn submit_code(
        &self,
        existing_token: Option<&str>,
        raw_code: &str,
    ) -> Result<CodeOutcome, AccessError> {
        let state = AccessState::AwaitingCode.next(AccessEvent::SubmitCode)?;

        let decision = CredentialValidator::new(self.pool.clone())
            .validate(raw_code)
            .await?;

        let grant = match decision {
            CredentialDecision::Granted(grant) => grant,
            CredentialDecision::Denied => {
                // A denied attempt leaves nobody signed in
                if let Some(token) = existing_token {
                    if self.identity.sign_out(token).await? {
                        debug!("Ended presented session after denied code");
                    }
                }
                info!("Access code denied");
                return Ok(CodeOutcome {
                    decision: CodeDecision::Denied,
                    state: state.next(AccessEvent::Deny)?,
                    token: None,
                    profile: None,
                    resumed: false,
                });
            }
        };

        let signed_in = self.identity.sign_in_anonymously(existing_token).await?;

        match self.bind_grant(state, &grant, &signed_in).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if signed_in.is_new {
                    if let Err(sign_out_err) = self.identity.sign_out(&signed_in.token).await {
                        warn!(error = %sign_out_err, "Could not end session after failed redemption");
                    }
                }
                Err(e)
            }
        }
    }

    async fn bind_grant(
        &self,
        state: AccessState,
        grant: &RoleGrant,
        signed_in: &SignedIn,
    ) -> Result<CodeOutcome, AccessError> {
        let identity_id = signed_in.session.identity_id;
        let existing = UserProfile::find_by_uid(&self.pool, identity_id).await?;

        let (event, profile) = match existing {
            Some(profile) if profile.is_complete() => (AccessEvent::Resume, Some(profile)),
            _ if grant.role.is_admin() => {
                let profile = UserProfile::upsert(
                    &self.pool,
                    &UpsertUserProfile {
                        uid: identity_id,
                        role: Role::Admin,
                        tier: grant.tier,
                        display_name: ADMIN_DISPLAY_NAME,
                        contact_type: ContactType::Email,
                        contact_info: ADMIN_CONTACT_PLACEHOLDER,
                        access_code: &grant.code,
                    },
                )
                .await?;
                self.record_redemption(grant.invite_id).await?;
                (AccessEvent::ProvisionAdmin, Some(profile))
            }
            _ => (AccessEvent::RequireOnboarding, None),
        };

        let next = state.next(event)?;
        let grant_state = match next {
            AccessState::Onboarding => GrantState::Onboarding,
            _ => GrantState::Active,
        };
        // A resumed identity keeps its stored role whatever code it presented
        let (role, tier) = match (&profile, event) {
            (Some(stored), AccessEvent::Resume) => (stored.role, stored.tier),
            _ => (grant.role, grant.tier),
        };

        AccessGrant::upsert(
            &self.pool,
            &UpsertAccessGrant {
                session_id: signed_in.session.id,
                role,
                tier,
                invite_id: grant.invite_id,
                access_code: &grant.code,
                state: grant_state,
            },
        )
        .await?;

        info!(
            identity_id = %identity_id,
            role = %role,
            event = %event,
            state = %next,
            "Access code granted"
        );

        Ok(CodeOutcome {
            decision: grant.role.into(),
            state: next,
            token: Some(signed_in.token.clone()),
            profile,
            resumed: event == AccessEvent::Resume,
        })
    }

    /// Finish onboarding (or resubmit the form) for the session behind `token`
    pub async fn complete_profile(
        &self,
        token: &str,
        submission: &ProfileSubmission,
    ) -> Result<UserProfile, AccessError> {
        let display_name = submission.display_name.trim();
        if display_name.is_empty() {
            return Err(AccessError::Validation("Display name is required".to_string()));
        }
        let contact_info = match submission.contact_info.trim() {
            "" => CONTACT_PLACEHOLDER,
            trimmed => trimmed,
        };

        let session = self
            .identity
            .resolve(token)
            .await?
            .ok_or(AccessError::Unauthenticated)?;
        let grant = AccessGrant::find_by_session_id(&self.pool, session.id)
            .await?
            .ok_or(AccessError::NoPendingGrant)?;
        let next = AccessState::from(grant.state).next(AccessEvent::CompleteProfile)?;

        let first = UserProfile::complete_first(
            &self.pool,
            &UpsertUserProfile {
                uid: session.identity_id,
                role: grant.role,
                tier: grant.tier,
                display_name,
                contact_type: submission.contact_type,
                contact_info,
                access_code: &grant.access_code,
            },
        )
        .await?;
        let profile = match first {
            Some(profile) => {
                self.record_redemption(grant.invite_id).await?;
                profile
            }
            None => {
                UserProfile::update_details(
                    &self.pool,
                    session.identity_id,
                    display_name,
                    submission.contact_type,
                    contact_info,
                )
                .await?
            }
        };

        if grant.state != GrantState::Active {
            AccessGrant::update_state(&self.pool, session.id, GrantState::Active).await?;
        }

        info!(
            identity_id = %session.identity_id,
            state = %next,
            "Profile completed"
        );

        Ok(profile)
    }

    /// Always succeeds locally; the provider call is best effort
    pub async fn logout(&self, token: Option<&str>) -> AccessState {
        if let Some(token) = token {
            match self.identity.sign_out(token).await {
                Ok(true) => info!("Session ended"),
                Ok(false) => debug!("Logout for unknown session"),
                Err(e) => warn!(error = %e, "Sign-out failed, dropping session client-side only"),
            }
        }
        AccessState::Unauthenticated
    }

    pub async fn current(&self, token: &str) -> Result<SessionView, AccessError> {
        let session = self
            .identity
            .resolve(token)
            .await?
            .ok_or(AccessError::Unauthenticated)?;
        let grant = AccessGrant::find_by_session_id(&self.pool, session.id).await?;
        let profile = UserProfile::find_by_uid(&self.pool, session.identity_id).await?;

        let state = match &grant {
            Some(grant) => grant.state.into(),
            None => AccessState::AwaitingCode,
        };

        Ok(SessionView {
            state,
            role: profile
                .as_ref()
                .map(|p| p.role)
                .or(grant.as_ref().map(|g| g.role)),
            tier: profile
                .as_ref()
                .and_then(|p| p.tier)
                .or(grant.as_ref().and_then(|g| g.tier)),
            profile,
        })
    }

    /// Resolve `token` to an active caller. The role comes from the stored
    /// profile so clients cannot claim privileges.
    pub async fn authorize(&self, token: &str) -> Result<Actor, AccessError> {
        let session = self
            .identity
            .resolve(token)
            .await?
            .ok_or(AccessError::Unauthenticated)?;
        let grant = AccessGrant::find_by_session_id(&self.pool, session.id)
            .await?
            .ok_or(AccessError::Unauthenticated)?;
        if grant.state != GrantState::Active {
            return Err(AccessError::OnboardingIncomplete);
        }
        let profile = UserProfile::find_by_uid(&self.pool, session.identity_id)
            .await?
            .filter(UserProfile::is_complete)
            .ok_or(AccessError::OnboardingIncomplete)?;

        Ok(Actor {
            session_id: session.id,
            identity_id: session.identity_id,
            role: profile.role,
            display_name: profile.display_name,
        })
    }

    /// Informational counter, no cap is enforced
    async fn record_redemption(&self, invite_id: Option<Uuid>) -> Result<(), AccessError> {
        if let Some(invite_id) = invite_id {
            Invite::increment_used_count(&self.pool, invite_id).await?;
        }
        Ok(())
    }
}
