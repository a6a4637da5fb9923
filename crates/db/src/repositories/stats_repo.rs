//! Repository for the `learner_stats` table.

use chrono::NaiveDate;
use promptcademy_core::types::DbId;
use sqlx::PgPool;

use crate::models::stats::LearnerStats;

const COLUMNS: &str = "user_id, xp, streak, last_check_in";

pub struct StatsRepo;

impl StatsRepo {
    pub async fn find(pool: &PgPool, user_id: DbId) -> Result<Option<LearnerStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM learner_stats WHERE user_id = $1");
        sqlx::query_as::<_, LearnerStats>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Add `amount` XP, creating the row on first use.
    pub async fn add_xp(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
    ) -> Result<LearnerStats, sqlx::Error> {
        let query = format!(
            "INSERT INTO learner_stats (user_id, xp) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET
                xp = learner_stats.xp + EXCLUDED.xp,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnerStats>(&query)
            .bind(user_id)
            .bind(amount)
            .fetch_one(pool)
            .await
    }

    /// Store the streak produced by a check-in on `day`.
    pub async fn save_check_in(
        pool: &PgPool,
        user_id: DbId,
        streak: i32,
        day: NaiveDate,
    ) -> Result<LearnerStats, sqlx::Error> {
        let query = format!(
            "INSERT INTO learner_stats (user_id, streak, last_check_in) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET
                streak = EXCLUDED.streak,
                last_check_in = EXCLUDED.last_check_in,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnerStats>(&query)
            .bind(user_id)
            .bind(streak)
            .bind(day)
            .fetch_one(pool)
            .await
    }
}
