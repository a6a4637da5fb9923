//! Admin-only routes (forced rotation, plan changes).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use promptcademy_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A signed-in admin. No session is 401; a learner session is 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::debug!(user_id = user.user_id, "Admin route refused for learner");
            return Err(AppError::Core(CoreError::Forbidden(
                "Only admins can do this".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
