use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    auth::{jwt::JwtKeys, repo::UserStore, repo_types::User},
    error::AppError,
};

/// The caller's user record, resolved from the request's bearer token.
///
/// Every request verifies the token and reloads the user; nothing is cached.
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
    Arc<dyn UserStore>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            warn!("missing or non-bearer Authorization header");
            AppError::Unauthenticated
        })?;

        let keys = JwtKeys::from_ref(state);
        let user_id = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthenticated
        })?;

        let users = <Arc<dyn UserStore> as FromRef<S>>::from_ref(state);
        match users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                warn!(user_id = %user_id, "token subject no longer exists");
                Err(AppError::Unauthenticated)
            }
            Err(e) => {
                error!(error = %e, user_id = %user_id, "user lookup failed");
                Err(e.into())
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
