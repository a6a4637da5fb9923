//! Repository for the `badges` table.

use promptcademy_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::stats::Badge;

pub struct BadgeRepo;

impl BadgeRepo {
    /// Award a badge once. Returns `true` only when it was newly earned.
    pub async fn award(
        pool: &PgPool,
        user_id: DbId,
        badge_id: &str,
        label: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO badges (user_id, badge_id, label, earned_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, badge_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(label)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Badges earned by a user, oldest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Badge>, sqlx::Error> {
        sqlx::query_as::<_, Badge>(
            "SELECT badge_id, label, earned_at FROM badges
             WHERE user_id = $1
             ORDER BY earned_at, badge_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
