//! Gamification rows: per-learner XP/streak and earned badges.

use chrono::NaiveDate;
use promptcademy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `learner_stats`. Learners without a row have all-zero stats.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub user_id: DbId,
    pub xp: i64,
    pub streak: i32,
    pub last_check_in: Option<NaiveDate>,
}

impl LearnerStats {
    pub fn empty(user_id: DbId) -> Self {
        Self {
            user_id,
            xp: 0,
            streak: 0,
            last_check_in: None,
        }
    }
}

/// A row from `badges`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub badge_id: String,
    pub label: String,
    pub earned_at: Timestamp,
}
