//! Authentication gate
//!
//! Handlers that take an [`AuthUser`] argument are protected: axum runs the
//! extractor before the handler body, so a request without a valid bearer
//! token is rejected with 401 and the handler never executes.

use super::jwt::{TokenError, TokenService};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Authenticated caller, valid for the current request only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

/// Why the gate refused a request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not a bearer token")]
    InvalidScheme,
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized("Invalid or missing authentication token".to_string())
    }
}

/// Run the gate's checks against request headers
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidScheme)?;

    let claims = tokens.validate(token)?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        match authenticate(&parts.headers, app_state.tokens()) {
            Ok(user) => {
                debug!(user_id = user.user_id, "Request authenticated");
                Ok(user)
            }
            Err(reason) => {
                warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    %reason,
                    "Rejected unauthenticated request"
                );
                Err(reason.into())
            }
        }
    }
}
