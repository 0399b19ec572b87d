//! Anonymous identities backed by server-side sessions.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use db::models::session::Session;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Result of an anonymous sign-in
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: Session,
    /// Bearer token handed to the client; never stored in clear
    pub token: String,
    /// False when an existing session was reused
    pub is_new: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Reuse the identity behind `existing_token` if it is still signed in,
    /// otherwise mint a fresh anonymous identity and session.
    async fn sign_in_anonymously(
        &self,
        existing_token: Option<&str>,
    ) -> Result<SignedIn, IdentityError>;

    async fn resolve(&self, token: &str) -> Result<Option<Session>, IdentityError>;

    /// Ends the session. Returns false if it was already gone.
    async fn sign_out(&self, token: &str) -> Result<bool, IdentityError>;
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Session store in the application database
#[derive(Clone)]
pub struct SqliteIdentityProvider {
    pool: SqlitePool,
}

impl SqliteIdentityProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for SqliteIdentityProvider {
    async fn sign_in_anonymously(
        &self,
        existing_token: Option<&str>,
    ) -> Result<SignedIn, IdentityError> {
        if let Some(token) = existing_token {
            if let Some(session) = self.resolve(token).await? {
                debug!(identity_id = %session.identity_id, "Reusing signed-in identity");
                return Ok(SignedIn {
                    session,
                    token: token.to_string(),
                    is_new: false,
                });
            }
        }

        let token = generate_token();
        let session = Session::create(
            &self.pool,
            Uuid::new_v4(),
            Uuid::new_v4(),
            &hash_token(&token),
        )
        .await?;

        info!(
            session_id = %session.id,
            identity_id = %session.identity_id,
            "Created anonymous identity"
        );

        Ok(SignedIn {
            session,
            token,
            is_new: true,
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<Session>, IdentityError> {
        let session = Session::find_by_token_hash(&self.pool, &hash_token(token)).await?;
        if let Some(session) = &session {
            Session::touch(&self.pool, session.id).await?;
        }
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<bool, IdentityError> {
        let removed = Session::delete_by_token_hash(&self.pool, &hash_token(token)).await?;
        Ok(removed > 0)
    }
}
