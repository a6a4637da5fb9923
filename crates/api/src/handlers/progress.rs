//! Handlers for learner progress and the dashboard.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use promptcademy_core::gamification::badges_for_completions;
use promptcademy_core::progress::{completion_percent, ProgressStatus, ProgressSummary};
use promptcademy_core::types::DbId;
use promptcademy_db::models::lesson::Lesson;
use promptcademy_db::models::progress::ProgressItem;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::lessons::resolve_today;
use crate::handlers::stats::award_badges;
use crate::middleware::auth::AuthUser;
use crate::response::OkResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /progress`. `status` is parsed by the handler so
/// an unknown value is a validation error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordProgressRequest {
    pub lesson_id: DbId,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordProgressBody {
    pub summary: ProgressSummary,
    /// Badges earned by this update.
    pub new_badges: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ProgressListBody {
    pub items: Vec<ProgressItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBody {
    pub daily: Lesson,
    pub completed_count: i64,
    pub total_count: i64,
    pub progress_pct: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /progress
///
/// Upsert the caller's progress on one lesson and return their summary.
pub async fn record(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<RecordProgressRequest>,
) -> AppResult<Json<OkResponse<RecordProgressBody>>> {
    let status: ProgressStatus = input.status.parse()?;
    let now = Utc::now();

    let summary = state
        .store
        .record_progress(user.user_id, input.lesson_id, status, now)
        .await?;

    let new_badges = if status.is_completed() {
        award_badges(&state, user.user_id, badges_for_completions(summary.completed), now).await?
    } else {
        Vec::new()
    };

    tracing::debug!(
        user_id = user.user_id,
        lesson_id = input.lesson_id,
        status = %status,
        completed = summary.completed,
        "Recorded progress"
    );

    Ok(Json(OkResponse::new(RecordProgressBody {
        summary,
        new_badges,
    })))
}

/// GET /progress/summary
///
/// The caller's progress rows, most recent completion first.
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<OkResponse<ProgressListBody>>> {
    let items = state.store.list_progress(user.user_id).await?;
    Ok(Json(OkResponse::new(ProgressListBody { items })))
}

/// GET /dashboard
///
/// Today's lesson plus completion counts against the whole catalog.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<OkResponse<DashboardBody>>> {
    let daily = resolve_today(&state).await?;
    let summary = state.store.progress_summary(user.user_id).await?;
    let total_count = state.store.count_lessons().await?;

    Ok(Json(OkResponse::new(DashboardBody {
        daily,
        completed_count: summary.completed,
        total_count,
        progress_pct: completion_percent(summary.completed, total_count),
    })))
}
