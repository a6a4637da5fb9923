//! Repository for the `progress` table.

use promptcademy_core::progress::{ProgressStatus, ProgressSummary};
use promptcademy_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::progress::ProgressItem;

pub struct ProgressRepo;

impl ProgressRepo {
    /// Upsert the `(user_id, lesson_id)` row.
    ///
    /// `completed_at` is set to `now` only for `completed`; any other status
    /// keeps the stored timestamp.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
        status: ProgressStatus,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO progress (user_id, lesson_id, status, completed_at)
             VALUES ($1, $2, $3, CASE WHEN $3 = 'completed' THEN $4::TIMESTAMPTZ ELSE NULL END)
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                status = EXCLUDED.status,
                completed_at = CASE
                    WHEN EXCLUDED.status = 'completed' THEN EXCLUDED.completed_at
                    ELSE progress.completed_at
                END,
                updated_at = NOW()",
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(status.as_str())
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Completed and total row counts for a user.
    pub async fn summary(pool: &PgPool, user_id: DbId) -> Result<ProgressSummary, sqlx::Error> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE status = 'completed'),
                COUNT(*)
             FROM progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(ProgressSummary { completed, total })
    }

    /// All progress rows for a user, most recent completion first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProgressItem>, sqlx::Error> {
        sqlx::query_as::<_, ProgressItem>(
            "SELECT p.lesson_id, p.status, p.completed_at, l.title, l.track
             FROM progress p
             JOIN lessons l ON l.id = p.lesson_id
             WHERE p.user_id = $1
             ORDER BY p.completed_at DESC NULLS LAST, p.lesson_id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
