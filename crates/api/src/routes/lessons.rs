//! Route definitions for lessons and the daily rotation.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lessons;
use crate::state::AppState;

/// ```text
/// GET  /lesson/today       -> today
/// POST /rotate             -> rotate (admin)
/// GET  /debug/state        -> debug_state
/// GET  /lessons            -> list
/// GET  /lessons/{id}       -> get_by_id
/// POST /lessons/{id}/run   -> run (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lesson/today", get(lessons::today))
        .route("/rotate", post(lessons::rotate))
        .route("/debug/state", get(lessons::debug_state))
        .route("/lessons", get(lessons::list))
        .route("/lessons/{id}", get(lessons::get_by_id))
        .route("/lessons/{id}/run", post(lessons::run))
}
