//! In-process [`Store`] with the same semantics as [`crate::store::PgStore`].
//!
//! Used by tests and by the server when no `DATABASE_URL` is configured.
//! State is lost when the process exits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use promptcademy_core::error::CoreError;
use promptcademy_core::gamification::BadgeDef;
use promptcademy_core::progress::{
    listing_order, next_completed_at, ProgressStatus, ProgressSummary,
};
use promptcademy_core::roles::PLAN_FREE;
use promptcademy_core::rotation::RotationStore;
use promptcademy_core::types::{DbId, Timestamp};

use crate::models::lesson::{CreateLesson, Lesson};
use crate::models::progress::ProgressItem;
use crate::models::stats::{Badge, LearnerStats};
use crate::models::user::{CreateUser, User};
use crate::store::{LessonStore, ProgressStore, StatsStore, Store, StoreError, UserStore};

#[derive(Debug, Clone)]
struct ProgressRow {
    status: ProgressStatus,
    completed_at: Option<Timestamp>,
}

#[derive(Default)]
struct State {
    app_state: HashMap<String, String>,
    lessons: Vec<Lesson>,
    users: Vec<User>,
    progress: HashMap<(DbId, DbId), ProgressRow>,
    stats: HashMap<DbId, LearnerStats>,
    badges: HashMap<DbId, Vec<Badge>>,
    next_lesson_id: DbId,
    next_user_id: DbId,
}

/// Mutex-guarded maps standing in for the PostgreSQL tables.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Internal("memory store lock poisoned".into()).into())
    }
}

#[async_trait]
impl RotationStore for MemoryStore {
    type Error = StoreError;

    async fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.app_state.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?
            .app_state
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn active_lesson_ids(&self) -> Result<Vec<DbId>, StoreError> {
        let state = self.lock()?;
        let mut ids: Vec<DbId> = state
            .lessons
            .iter()
            .filter(|l| l.is_active)
            .map(|l| l.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl LessonStore for MemoryStore {
    async fn list_lessons(&self, track: Option<&str>) -> Result<Vec<Lesson>, StoreError> {
        let state = self.lock()?;
        let mut lessons: Vec<Lesson> = state
            .lessons
            .iter()
            .filter(|l| track.map_or(true, |t| l.track == t))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.sort_order, l.id));
        Ok(lessons)
    }

    async fn find_lesson(&self, id: DbId) -> Result<Option<Lesson>, StoreError> {
        Ok(self.lock()?.lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn count_lessons(&self) -> Result<i64, StoreError> {
        Ok(self.lock()?.lessons.len() as i64)
    }

    async fn insert_lesson(&self, input: &CreateLesson) -> Result<Lesson, StoreError> {
        let mut state = self.lock()?;
        state.next_lesson_id += 1;
        let lesson = Lesson {
            id: state.next_lesson_id,
            title: input.title.clone(),
            track: input.track.clone(),
            content: input.content.clone(),
            prompt_template: input.prompt_template.clone(),
            sort_order: input.sort_order.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };
        state.lessons.push(lesson.clone());
        Ok(lesson)
    }
}

/// Email equality as the `lower(email)` index sees it, non-ASCII included.
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|u| same_email(&u.email, &input.email))
        {
            return Err(CoreError::Conflict(format!(
                "A user with email '{}' already exists",
                input.email
            ))
            .into());
        }
        state.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: state.next_user_id,
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            plan: PLAN_FREE.to_string(),
            role: input.role.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_plan(&self, id: DbId, plan: &str) -> Result<Option<User>, StoreError> {
        let mut state = self.lock()?;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.plan = plan.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert_progress(
        &self,
        user_id: DbId,
        lesson_id: DbId,
        status: ProgressStatus,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let existing = state
            .progress
            .get(&(user_id, lesson_id))
            .and_then(|row| row.completed_at);
        state.progress.insert(
            (user_id, lesson_id),
            ProgressRow {
                status,
                completed_at: next_completed_at(existing, status, now),
            },
        );
        Ok(())
    }

    async fn progress_summary(&self, user_id: DbId) -> Result<ProgressSummary, StoreError> {
        let state = self.lock()?;
        Ok(ProgressSummary::from_statuses(
            state
                .progress
                .iter()
                .filter(|((uid, _), _)| *uid == user_id)
                .map(|(_, row)| row.status),
        ))
    }

    async fn list_progress(&self, user_id: DbId) -> Result<Vec<ProgressItem>, StoreError> {
        let state = self.lock()?;
        let mut items: Vec<ProgressItem> = state
            .progress
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .filter_map(|((_, lesson_id), row)| {
                let lesson = state.lessons.iter().find(|l| l.id == *lesson_id)?;
                Some(ProgressItem {
                    lesson_id: *lesson_id,
                    status: row.status.as_str().to_string(),
                    completed_at: row.completed_at,
                    title: lesson.title.clone(),
                    track: lesson.track.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| {
            listing_order((a.completed_at, a.lesson_id), (b.completed_at, b.lesson_id))
        });
        Ok(items)
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn learner_stats(&self, user_id: DbId) -> Result<LearnerStats, StoreError> {
        Ok(self
            .lock()?
            .stats
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| LearnerStats::empty(user_id)))
    }

    async fn add_xp(&self, user_id: DbId, amount: i64) -> Result<LearnerStats, StoreError> {
        let mut state = self.lock()?;
        let stats = state
            .stats
            .entry(user_id)
            .or_insert_with(|| LearnerStats::empty(user_id));
        stats.xp += amount;
        Ok(stats.clone())
    }

    async fn save_check_in(
        &self,
        user_id: DbId,
        streak: i32,
        day: NaiveDate,
    ) -> Result<LearnerStats, StoreError> {
        let mut state = self.lock()?;
        let stats = state
            .stats
            .entry(user_id)
            .or_insert_with(|| LearnerStats::empty(user_id));
        stats.streak = streak;
        stats.last_check_in = Some(day);
        Ok(stats.clone())
    }

    async fn award_badge(
        &self,
        user_id: DbId,
        badge: &BadgeDef,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let earned = state.badges.entry(user_id).or_default();
        if earned.iter().any(|b| b.badge_id == badge.id) {
            return Ok(false);
        }
        earned.push(Badge {
            badge_id: badge.id.to_string(),
            label: badge.label.to_string(),
            earned_at: now,
        });
        Ok(true)
    }

    async fn list_badges(&self, user_id: DbId) -> Result<Vec<Badge>, StoreError> {
        Ok(self
            .lock()?
            .badges
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
