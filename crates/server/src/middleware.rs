//! Request extractors for bearer sessions.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use services::services::access::Actor;

use crate::{DeploymentImpl, error::ApiError};

/// JSON body whose rejections go through [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::debug!(scheme, "Ignoring non-bearer authorization");
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// The bearer token, if the client sent one. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeBearer(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeBearer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeBearer(bearer_token(parts)))
    }
}

/// A bearer token that must be present
#[derive(Debug, Clone)]
pub struct Bearer(pub String);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts).map(Bearer).ok_or(ApiError::Unauthorized)
    }
}

/// An active member; the role is read from the stored profile
#[derive(Debug, Clone)]
pub struct Member(pub Actor);

impl FromRequestParts<DeploymentImpl> for Member {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, deployment).await?;
        let actor = deployment.access().authorize(&token).await?;
        Ok(Member(actor))
    }
}

/// An active member whose stored role is admin
#[derive(Debug, Clone)]
pub struct Admin(pub Actor);

impl FromRequestParts<DeploymentImpl> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let Member(actor) = Member::from_request_parts(parts, deployment).await?;
        if !actor.is_admin() {
            tracing::warn!(identity_id = %actor.identity_id, "Non-admin hit an admin route");
            return Err(ApiError::Forbidden);
        }
        Ok(Admin(actor))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_parsed() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc123"))).as_deref(), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("bearer  abc123 "))).as_deref(), Some("abc123"));
    }

    #[test]
    fn other_schemes_and_blanks_are_ignored() {
        assert_eq!(bearer_token(&parts(None)), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwdw=="))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
    }
}
