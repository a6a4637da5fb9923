//! Handlers for the `/auth` resource (signup, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use promptcademy_core::error::CoreError;
use promptcademy_core::roles::{ROLE_ADMIN, ROLE_LEARNER};
use promptcademy_db::models::user::{CreateUser, User, UserResponse};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{check_signup_password, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::OkResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthBody {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/signup
///
/// Create a learner account (or an admin account for `ADMIN_EMAIL`) and
/// return a token. Emails are unique regardless of case.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<OkResponse<AuthBody>>)> {
    let name = input.name.trim();
    let email = input.email.trim();

    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation("Name is required".into())));
    }
    if !is_plausible_email(email) {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email is required".into(),
        )));
    }
    check_signup_password(&input.password)?;

    if state.store.find_user_by_email(email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let role = if state.config.is_admin_email(email) {
        ROLE_ADMIN
    } else {
        ROLE_LEARNER
    };

    let user = state
        .store
        .create_user(&CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role: role.to_string(),
        })
        .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User signed up");

    let body = auth_body(&state, &user)?;
    Ok((StatusCode::CREATED, Json(OkResponse::new(body))))
}

/// POST /auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<OkResponse<AuthBody>>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = state
        .store
        .find_user_by_email(input.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let body = auth_body(&state, &user)?;
    Ok(Json(OkResponse::new(body)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<OkResponse<UserBody>>> {
    let user = state
        .store
        .find_user(auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    Ok(Json(OkResponse::new(UserBody {
        user: UserResponse::from(&user),
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_body(state: &AppState, user: &User) -> AppResult<AuthBody> {
    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthBody {
        token,
        user: UserResponse::from(user),
    })
}

/// One `@` with something on both sides and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    }
}
