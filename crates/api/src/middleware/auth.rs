//! Session extractors.
//!
//! Protected handlers take an [`AuthUser`]; coach scoring takes a
//! [`MaybeAuthUser`] so anonymous visitors can still try it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use promptcademy_core::error::CoreError;
use promptcademy_core::roles::ROLE_ADMIN;
use promptcademy_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in learner behind a `Bearer` session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// `Some(AuthUser)` for a valid session, `None` when the request carries no
/// `Authorization` header at all. A header with a bad token is still a 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}

/// Resolve the session from the `Authorization` header, if one was sent.
fn session_from_parts(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Expected 'Authorization: Bearer <token>'"))?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| unauthorized("Session is invalid or has expired"))?;

    Ok(Some(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)?.ok_or_else(|| unauthorized("Sign in to continue"))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state).map(MaybeAuthUser)
    }
}
