//! Handlers for the lesson catalog, the daily rotation and the playground.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use promptcademy_coach::client::PLAYGROUND_MAX_TOKENS;
use promptcademy_coach::prompt::playground_prompt;
use promptcademy_core::error::CoreError;
use promptcademy_core::rotation::{KEY_CURRENT_DAY, KEY_CURRENT_LESSON_ID};
use promptcademy_core::types::DbId;
use promptcademy_db::models::lesson::Lesson;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::OkResponse;
use crate::state::AppState;

/// Track filter value meaning "every track".
const ALL_TRACKS: &str = "All";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LessonListQuery {
    pub track: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LessonBody {
    pub lesson: Lesson,
}

#[derive(Debug, Serialize)]
pub struct LessonListBody {
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize)]
pub struct RotateBody {
    pub forced: bool,
    pub lesson: Lesson,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStateBody {
    pub daily_lesson_id: Option<DbId>,
    pub current_day: Option<String>,
}

/// Request body for `POST /lessons/{id}/run`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLessonRequest {
    #[serde(default)]
    pub user_input: String,
}

#[derive(Debug, Serialize)]
pub struct RunLessonBody {
    pub output: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /lesson/today
///
/// The lesson every user sees today. Advances the rotation on the first
/// read of a new day.
pub async fn today(State(state): State<AppState>) -> AppResult<Json<OkResponse<LessonBody>>> {
    let lesson = resolve_today(&state).await?;
    Ok(Json(OkResponse::new(LessonBody { lesson })))
}

/// POST /rotate
///
/// Force the rotation forward regardless of the current day (admin only).
pub async fn rotate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<OkResponse<RotateBody>>> {
    let outcome = state
        .rotation
        .force_rotate(&*state.store, Utc::now())
        .await?;
    let lesson = load_lesson(&state, outcome.lesson_id).await?;

    tracing::info!(
        admin_id = admin.user_id,
        lesson_id = lesson.id,
        "Forced daily lesson rotation"
    );

    Ok(Json(OkResponse::new(RotateBody {
        forced: true,
        lesson,
    })))
}

/// GET /debug/state
///
/// Current rotation pointer and day marker, read without rotating.
pub async fn debug_state(
    State(state): State<AppState>,
) -> AppResult<Json<OkResponse<DebugStateBody>>> {
    let daily_lesson_id = state
        .store
        .get_state(KEY_CURRENT_LESSON_ID)
        .await?
        .and_then(|v| v.trim().parse::<DbId>().ok());
    let current_day = state.store.get_state(KEY_CURRENT_DAY).await?;

    Ok(Json(OkResponse::new(DebugStateBody {
        daily_lesson_id,
        current_day,
    })))
}

/// GET /lessons?track=
///
/// The catalog, optionally filtered by track. `All` or no value lists every lesson.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LessonListQuery>,
) -> AppResult<Json<OkResponse<LessonListBody>>> {
    let track = params
        .track
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(ALL_TRACKS));
    let lessons = state.store.list_lessons(track).await?;
    Ok(Json(OkResponse::new(LessonListBody { lessons })))
}

/// GET /lessons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<OkResponse<LessonBody>>> {
    let lesson = load_lesson(&state, id).await?;
    Ok(Json(OkResponse::new(LessonBody { lesson })))
}

/// POST /lessons/{id}/run
///
/// Run the lesson's prompt template followed by the learner's input through
/// the completion API.
pub async fn run(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<RunLessonRequest>,
) -> AppResult<Json<OkResponse<RunLessonBody>>> {
    let lesson = load_lesson(&state, id).await?;
    let prompt = playground_prompt(&lesson.prompt_template, &input.user_input);

    let output = state
        .coach
        .complete(&prompt, PLAYGROUND_MAX_TOKENS)
        .await
        .map_err(AppError::from)?;

    tracing::debug!(user_id = user.user_id, lesson_id = id, "Playground run completed");
    Ok(Json(OkResponse::new(RunLessonBody { output })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve today's lesson through the rotation.
pub(crate) async fn resolve_today(state: &AppState) -> AppResult<Lesson> {
    let outcome = state
        .rotation
        .today_lesson(&*state.store, Utc::now())
        .await?;
    if outcome.advanced {
        tracing::info!(
            lesson_id = outcome.lesson_id,
            day = %outcome.day,
            "Daily lesson rotated"
        );
    }
    load_lesson(state, outcome.lesson_id).await
}

async fn load_lesson(state: &AppState, id: DbId) -> AppResult<Lesson> {
    state
        .store
        .find_lesson(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))
}
