use axum::routing::post;
use axum::Router;

use crate::handlers::coach;
use crate::state::AppState;

/// Routes mounted at `/api/coach`.
///
/// ```text
/// POST /score   -> score (optional auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/score", post(coach::score))
}
