//! Repository for the `lessons` table.

use promptcademy_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson::{CreateLesson, Lesson};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, track, content, prompt_template, sort_order, is_active, created_at";

/// Provides catalog queries for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Insert a new lesson, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateLesson) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (title, track, content, prompt_template, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(&input.title)
            .bind(&input.track)
            .bind(&input.content)
            .bind(&input.prompt_template)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a lesson by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List lessons, optionally restricted to one track.
    ///
    /// Ordered by sort_order, then id.
    pub async fn list(pool: &PgPool, track: Option<&str>) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lessons \
             WHERE ($1::TEXT IS NULL OR track = $1) \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(track)
            .fetch_all(pool)
            .await
    }

    /// Ids of all active lessons in ascending order.
    pub async fn active_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM lessons WHERE is_active = true ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Total number of lessons, active or not.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons")
            .fetch_one(pool)
            .await
    }
}
