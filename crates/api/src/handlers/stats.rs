//! Handlers for XP, streaks and badges.

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use promptcademy_core::gamification::{badges_for_streak, check_in, level_for_xp, BadgeDef};
use promptcademy_core::types::{DbId, Timestamp};
use promptcademy_db::models::stats::{Badge, LearnerStats};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::OkResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub xp: i64,
    pub streak: i32,
    pub last_check_in: Option<NaiveDate>,
    pub level: i64,
}

impl From<&LearnerStats> for StatsView {
    fn from(stats: &LearnerStats) -> Self {
        Self {
            xp: stats.xp,
            streak: stats.streak,
            last_check_in: stats.last_check_in,
            level: level_for_xp(stats.xp),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsBody {
    pub stats: StatsView,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInBody {
    pub stats: StatsView,
    pub new_badges: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /me/stats
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<OkResponse<StatsBody>>> {
    let stats = state.store.learner_stats(user.user_id).await?;
    let badges = state.store.list_badges(user.user_id).await?;
    Ok(Json(OkResponse::new(StatsBody {
        stats: StatsView::from(&stats),
        badges,
    })))
}

/// POST /me/check-in
///
/// Record today's visit. Repeating it on the same day changes nothing.
pub async fn check_in_today(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<OkResponse<CheckInBody>>> {
    let now = Utc::now();
    let today = state.rotation.day_of(now);
    let current = state.store.learner_stats(user.user_id).await?;

    let outcome = check_in(current.streak, current.last_check_in, today);
    if !outcome.changed {
        return Ok(Json(OkResponse::new(CheckInBody {
            stats: StatsView::from(&current),
            new_badges: Vec::new(),
        })));
    }

    let stats = state
        .store
        .save_check_in(user.user_id, outcome.streak, outcome.day)
        .await?;
    let new_badges = award_badges(&state, user.user_id, badges_for_streak(stats.streak), now).await?;

    tracing::debug!(user_id = user.user_id, streak = stats.streak, "Learner checked in");

    Ok(Json(OkResponse::new(CheckInBody {
        stats: StatsView::from(&stats),
        new_badges,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Award each badge once, returning the ids that were newly earned.
pub(crate) async fn award_badges(
    state: &AppState,
    user_id: DbId,
    badges: Vec<BadgeDef>,
    now: Timestamp,
) -> AppResult<Vec<&'static str>> {
    let mut earned = Vec::new();
    for badge in badges {
        if state.store.award_badge(user_id, &badge, now).await? {
            tracing::info!(user_id, badge = badge.id, "Badge earned");
            earned.push(badge.id);
        }
    }
    Ok(earned)
}
