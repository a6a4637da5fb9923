use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Routes mounted at `/me`. All require auth.
///
/// ```text
/// GET  /stats      -> stats
/// POST /check-in   -> check_in_today
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::stats))
        .route("/check-in", post(stats::check_in_today))
}
