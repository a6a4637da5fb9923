//! Storage seams used by the HTTP layer.
//!
//! Handlers hold an `Arc<dyn Store>`. [`PgStore`] delegates to the
//! repositories; [`crate::memory::MemoryStore`] keeps everything in process.

use async_trait::async_trait;
use chrono::NaiveDate;
use promptcademy_core::error::CoreError;
use promptcademy_core::gamification::BadgeDef;
use promptcademy_core::progress::{ProgressStatus, ProgressSummary};
use promptcademy_core::rotation::RotationStore;
use promptcademy_core::types::{DbId, Timestamp};

use crate::models::lesson::{CreateLesson, Lesson};
use crate::models::progress::ProgressItem;
use crate::models::stats::{Badge, LearnerStats};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    AppStateRepo, BadgeRepo, LessonRepo, ProgressRepo, StatsRepo, UserRepo,
};
use crate::DbPool;

/// Errors surfaced by any store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Lessons ordered by `sort_order`, then id. `None` lists every track.
    async fn list_lessons(&self, track: Option<&str>) -> Result<Vec<Lesson>, StoreError>;

    async fn find_lesson(&self, id: DbId) -> Result<Option<Lesson>, StoreError>;

    async fn count_lessons(&self) -> Result<i64, StoreError>;

    async fn insert_lesson(&self, input: &CreateLesson) -> Result<Lesson, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError>;

    /// Case-insensitive lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn update_plan(&self, id: DbId, plan: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Upsert one row. A non-completed status keeps any stored `completed_at`.
    async fn upsert_progress(
        &self,
        user_id: DbId,
        lesson_id: DbId,
        status: ProgressStatus,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    async fn progress_summary(&self, user_id: DbId) -> Result<ProgressSummary, StoreError>;

    /// Rows joined with their lesson, `completed_at` desc (nulls last), then
    /// `lesson_id` desc.
    async fn list_progress(&self, user_id: DbId) -> Result<Vec<ProgressItem>, StoreError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Stats for a learner, all zero when none were recorded yet.
    async fn learner_stats(&self, user_id: DbId) -> Result<LearnerStats, StoreError>;

    async fn add_xp(&self, user_id: DbId, amount: i64) -> Result<LearnerStats, StoreError>;

    async fn save_check_in(
        &self,
        user_id: DbId,
        streak: i32,
        day: NaiveDate,
    ) -> Result<LearnerStats, StoreError>;

    /// Returns `true` only when the badge was not held before.
    async fn award_badge(
        &self,
        user_id: DbId,
        badge: &BadgeDef,
        now: Timestamp,
    ) -> Result<bool, StoreError>;

    async fn list_badges(&self, user_id: DbId) -> Result<Vec<Badge>, StoreError>;
}

/// Everything the application needs from persistence.
#[async_trait]
pub trait Store:
    LessonStore + UserStore + ProgressStore + StatsStore + RotationStore<Error = StoreError>
{
    /// `Ok` when the backing storage is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Upsert progress for an existing lesson and return the learner's summary.
    async fn record_progress(
        &self,
        user_id: DbId,
        lesson_id: DbId,
        status: ProgressStatus,
        now: Timestamp,
    ) -> Result<ProgressSummary, StoreError> {
        if self.find_lesson(lesson_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Lesson",
                id: lesson_id,
            }
            .into());
        }
        self.upsert_progress(user_id, lesson_id, status, now).await?;
        self.progress_summary(user_id).await
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`Store`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RotationStore for PgStore {
    type Error = StoreError;

    async fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(AppStateRepo::get(&self.pool, key).await?)
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(AppStateRepo::set(&self.pool, key, value).await?)
    }

    async fn active_lesson_ids(&self) -> Result<Vec<DbId>, StoreError> {
        Ok(LessonRepo::active_ids(&self.pool).await?)
    }
}

#[async_trait]
impl LessonStore for PgStore {
    async fn list_lessons(&self, track: Option<&str>) -> Result<Vec<Lesson>, StoreError> {
        Ok(LessonRepo::list(&self.pool, track).await?)
    }

    async fn find_lesson(&self, id: DbId) -> Result<Option<Lesson>, StoreError> {
        Ok(LessonRepo::find_by_id(&self.pool, id).await?)
    }

    async fn count_lessons(&self) -> Result<i64, StoreError> {
        Ok(LessonRepo::count(&self.pool).await?)
    }

    async fn insert_lesson(&self, input: &CreateLesson) -> Result<Lesson, StoreError> {
        Ok(LessonRepo::create(&self.pool, input).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_plan(&self, id: DbId, plan: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::update_plan(&self.pool, id, plan).await?)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn upsert_progress(
        &self,
        user_id: DbId,
        lesson_id: DbId,
        status: ProgressStatus,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        Ok(ProgressRepo::upsert(&self.pool, user_id, lesson_id, status, now).await?)
    }

    async fn progress_summary(&self, user_id: DbId) -> Result<ProgressSummary, StoreError> {
        Ok(ProgressRepo::summary(&self.pool, user_id).await?)
    }

    async fn list_progress(&self, user_id: DbId) -> Result<Vec<ProgressItem>, StoreError> {
        Ok(ProgressRepo::list_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl StatsStore for PgStore {
    async fn learner_stats(&self, user_id: DbId) -> Result<LearnerStats, StoreError> {
        Ok(StatsRepo::find(&self.pool, user_id)
            .await?
            .unwrap_or_else(|| LearnerStats::empty(user_id)))
    }

    async fn add_xp(&self, user_id: DbId, amount: i64) -> Result<LearnerStats, StoreError> {
        Ok(StatsRepo::add_xp(&self.pool, user_id, amount).await?)
    }

    async fn save_check_in(
        &self,
        user_id: DbId,
        streak: i32,
        day: NaiveDate,
    ) -> Result<LearnerStats, StoreError> {
        Ok(StatsRepo::save_check_in(&self.pool, user_id, streak, day).await?)
    }

    async fn award_badge(
        &self,
        user_id: DbId,
        badge: &BadgeDef,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        Ok(BadgeRepo::award(&self.pool, user_id, badge.id, badge.label, now).await?)
    }

    async fn list_badges(&self, user_id: DbId) -> Result<Vec<Badge>, StoreError> {
        Ok(BadgeRepo::list_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
