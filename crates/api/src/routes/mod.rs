pub mod admin;
pub mod auth;
pub mod coach;
pub mod health;
pub mod lessons;
pub mod me;
pub mod progress;

use axum::Router;

use crate::state::AppState;

/// Build the JSON route tree.
///
/// Route hierarchy:
///
/// ```text
/// /lesson/today                     today's lesson (public)
/// /rotate                           force rotation (admin)
/// /debug/state                      rotation pointer (public)
/// /lessons                          catalog, ?track= filter (public)
/// /lessons/{id}                     one lesson (public)
/// /lessons/{id}/run                 playground (requires auth)
///
/// /progress                         record progress (requires auth)
/// /progress/summary                 progress rows (requires auth)
/// /dashboard                        daily lesson + counts (requires auth)
///
/// /api/coach/score                  AI scoring (optional auth)
///
/// /auth/signup                      create account (public)
/// /auth/login                       login (public)
/// /auth/me                          current user (requires auth)
///
/// /me/stats                         XP, level, streak, badges (requires auth)
/// /me/check-in                      daily check-in (requires auth)
///
/// /admin/users/{id}/plan            set plan (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(lessons::router())
        .merge(progress::router())
        .nest("/api/coach", coach::router())
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/admin", admin::router())
}
