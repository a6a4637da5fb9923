use axum::routing::put;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the admin role.
///
/// ```text
/// PUT /users/{id}/plan   -> set_plan
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/plan", put(admin::set_plan))
}
