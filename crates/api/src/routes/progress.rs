//! Route definitions for progress tracking.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// ```text
/// POST /progress           -> record
/// GET  /progress/summary   -> summary
/// GET  /dashboard          -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress", post(progress::record))
        .route("/progress/summary", get(progress::summary))
        .route("/dashboard", get(progress::dashboard))
}
