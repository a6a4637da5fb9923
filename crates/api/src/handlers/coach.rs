//! Handler for AI coach scoring.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use promptcademy_coach::CoachError;
use promptcademy_core::gamification::badges_for_score;
use promptcademy_core::scoring::{ScoreRequest, ScoreResult};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::stats::award_badges;
use crate::middleware::auth::MaybeAuthUser;
use crate::response::OkResponse;
use crate::state::AppState;

/// Error body that still carries a well-formed, zero-XP score.
#[derive(Debug, Serialize)]
pub struct ScoreFailure {
    pub ok: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(flatten)]
    pub result: ScoreResult,
}

/// POST /api/coach/score
///
/// Score a deliverable against a rubric. Signed-in learners are credited
/// with the awarded XP and any score badge.
///
/// Missing configuration and upstream failures answer 500 with a fallback
/// score (`total = 0`, `xpAwarded = 0`) and a remediation action; invalid
/// input answers 400.
pub async fn score(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppJson(request): AppJson<ScoreRequest>,
) -> AppResult<Response> {
    let result = match state.coach.score(&request).await {
        Ok(result) => result,
        Err(err @ CoachError::Invalid(_)) => return Err(err.into()),
        Err(err) => {
            let fallback = err.fallback_result();
            let (status, code, message) = AppError::from(err).parts();
            let body = ScoreFailure {
                ok: false,
                error: message,
                code,
                result: fallback,
            };
            return Ok((status, Json(body)).into_response());
        }
    };

    if let Some(user) = user {
        let now = Utc::now();
        state.store.add_xp(user.user_id, result.xp_awarded).await?;
        award_badges(&state, user.user_id, badges_for_score(result.total), now).await?;
        tracing::debug!(
            user_id = user.user_id,
            total = result.total,
            xp = result.xp_awarded,
            "Credited coach score"
        );
    }

    Ok(Json(OkResponse::new(result)).into_response())
}
