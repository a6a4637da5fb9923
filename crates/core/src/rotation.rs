//! Daily lesson rotation.
//!
//! One process-wide pointer names "today's lesson". The first read on a new
//! calendar day (in a fixed reference UTC offset) moves the pointer to the
//! next active lesson by ascending id, wrapping to the smallest active id
//! after the last one. The pointer and the day marker live in a key/value
//! store reached through [`RotationStore`].
//!
//! Only the sequential-wrap policy exists. Ordering depends on lesson ids
//! alone, never on seed order, track or insertion time.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// State keys
// ---------------------------------------------------------------------------

/// App-state key holding the ISO date (`YYYY-MM-DD`) of the last rotation.
pub const KEY_CURRENT_DAY: &str = "current_day";
/// App-state key holding the current lesson id, stored as a decimal string.
pub const KEY_CURRENT_LESSON_ID: &str = "current_lesson_id";

/// Day marker written by a forced rotation so the next read always advances.
pub const FORCED_ROTATION_DAY: &str = "1900-01-01";

/// Default reference offset: Toronto standard time (UTC-05:00).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -5 * 60;

const DAY_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Storage needed by the rotation: a string key/value table plus the ids of
/// the active lessons.
#[async_trait]
pub trait RotationStore: Send + Sync {
    type Error: From<CoreError> + Send;

    async fn get_state(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Insert or overwrite a key (last write wins).
    async fn set_state(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Ids of every lesson flagged active.
    async fn active_lesson_ids(&self) -> Result<Vec<DbId>, Self::Error>;
}

// ---------------------------------------------------------------------------
// Pure selection
// ---------------------------------------------------------------------------

/// Pick the lesson that follows `current`.
///
/// Returns the smallest active id strictly greater than `current`, or the
/// smallest active id when `current` is at or past the last one. A missing
/// pointer behaves like `0`. `None` only when `active_ids` is empty.
pub fn next_lesson_id(active_ids: &[DbId], current: Option<DbId>) -> Option<DbId> {
    let current = current.unwrap_or(0);
    active_ids
        .iter()
        .copied()
        .filter(|id| *id > current)
        .min()
        .or_else(|| active_ids.iter().copied().min())
}

/// Parse a stored pointer value. Unparsable values count as no pointer.
fn parse_pointer(value: Option<String>) -> Option<DbId> {
    value.and_then(|v| v.trim().parse::<DbId>().ok())
}

// ---------------------------------------------------------------------------
// Rotation driver
// ---------------------------------------------------------------------------

/// Result of resolving today's lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOutcome {
    pub lesson_id: DbId,
    pub day: NaiveDate,
    /// `true` when this call moved the pointer.
    pub advanced: bool,
}

/// Resolves today's lesson against a [`RotationStore`].
#[derive(Debug, Clone, Copy)]
pub struct DailyRotation {
    offset: FixedOffset,
}

impl DailyRotation {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build a rotation for an offset expressed in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CoreError> {
        FixedOffset::east_opt(minutes * 60)
            .map(Self::new)
            .ok_or_else(|| {
                CoreError::Configuration(format!("UTC offset of {minutes} minutes is out of range"))
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of `now` in the reference offset.
    pub fn day_of(&self, now: Timestamp) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Return today's lesson id, advancing the pointer if the stored day
    /// differs from today.
    ///
    /// Fails with [`CoreError::Configuration`] when no lesson is active.
    /// The read-then-write is not atomic; two concurrent first-of-day calls
    /// may both advance.
    pub async fn today_lesson<S>(
        &self,
        store: &S,
        now: Timestamp,
    ) -> Result<RotationOutcome, S::Error>
    where
        S: RotationStore + ?Sized,
    {
        let active = store.active_lesson_ids().await?;
        if active.is_empty() {
            return Err(CoreError::Configuration("no active lessons".into()).into());
        }

        let today = self.day_of(now);
        let today_str = today.format(DAY_FORMAT).to_string();

        let stored_day = store.get_state(KEY_CURRENT_DAY).await?;
        let pointer = parse_pointer(store.get_state(KEY_CURRENT_LESSON_ID).await?);

        if let Some(lesson_id) = pointer {
            if stored_day.as_deref() == Some(today_str.as_str()) {
                return Ok(RotationOutcome {
                    lesson_id,
                    day: today,
                    advanced: false,
                });
            }
        }

        let next = next_lesson_id(&active, pointer)
            .ok_or_else(|| CoreError::Configuration("no active lessons".into()))?;

        store
            .set_state(KEY_CURRENT_LESSON_ID, &next.to_string())
            .await?;
        store.set_state(KEY_CURRENT_DAY, &today_str).await?;

        Ok(RotationOutcome {
            lesson_id: next,
            day: today,
            advanced: true,
        })
    }

    /// Reset the day marker to [`FORCED_ROTATION_DAY`] and resolve again,
    /// which always advances the pointer once.
    pub async fn force_rotate<S>(
        &self,
        store: &S,
        now: Timestamp,
    ) -> Result<RotationOutcome, S::Error>
    where
        S: RotationStore + ?Sized,
    {
        store.set_state(KEY_CURRENT_DAY, FORCED_ROTATION_DAY).await?;
        self.today_lesson(store, now).await
    }
}

impl Default for DailyRotation {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES)
            .unwrap_or_else(|_| Self::new(Utc.fix()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    #[derive(Default)]
    struct TestStore {
        state: Mutex<HashMap<String, String>>,
        active: Vec<DbId>,
    }

    impl TestStore {
        fn with_lessons(active: Vec<DbId>) -> Self {
            Self {
                state: Mutex::new(HashMap::new()),
                active,
            }
        }

        fn put(&self, key: &str, value: &str) {
            self.state
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn value(&self, key: &str) -> Option<String> {
            self.state.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl RotationStore for TestStore {
        type Error = CoreError;

        async fn get_state(&self, key: &str) -> Result<Option<String>, CoreError> {
            Ok(self.value(key))
        }

        async fn set_state(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.put(key, value);
            Ok(())
        }

        async fn active_lesson_ids(&self) -> Result<Vec<DbId>, CoreError> {
            Ok(self.active.clone())
        }
    }

    /// Noon in Toronto on the given date.
    fn noon(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 17, 0, 0).unwrap()
    }

    #[test]
    fn next_id_picks_smallest_greater() {
        assert_eq!(next_lesson_id(&[1, 2, 3], Some(1)), Some(2));
        assert_eq!(next_lesson_id(&[3, 1, 7], Some(3)), Some(7));
    }

    #[test]
    fn next_id_wraps_after_last() {
        assert_eq!(next_lesson_id(&[1, 2, 3], Some(3)), Some(1));
        assert_eq!(next_lesson_id(&[4, 9], Some(42)), Some(4));
    }

    #[test]
    fn next_id_without_pointer_starts_at_first() {
        assert_eq!(next_lesson_id(&[5, 2, 8], None), Some(2));
    }

    #[test]
    fn next_id_skips_gaps_left_by_inactive_lessons() {
        assert_eq!(next_lesson_id(&[1, 4, 6], Some(2)), Some(4));
    }

    #[test]
    fn next_id_empty_catalog() {
        assert_eq!(next_lesson_id(&[], Some(1)), None);
    }

    #[test]
    fn day_uses_reference_offset() {
        let rotation = DailyRotation::default();
        // 03:00 UTC on Jan 2 is still Jan 1 in Toronto.
        let late_evening = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();
        assert_eq!(
            rotation.day_of(late_evening),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        assert_matches!(
            DailyRotation::from_offset_minutes(24 * 60),
            Err(CoreError::Configuration(_))
        );
        assert!(DailyRotation::from_offset_minutes(60).is_ok());
    }

    #[tokio::test]
    async fn advances_on_new_day_then_wraps_on_forced_rotation() {
        let store = TestStore::with_lessons(vec![1, 2, 3]);
        store.put(KEY_CURRENT_LESSON_ID, "2");
        store.put(KEY_CURRENT_DAY, "2024-01-01");
        let rotation = DailyRotation::default();

        let first = rotation.today_lesson(&store, noon(2024, 1, 2)).await.unwrap();
        assert_eq!(first.lesson_id, 3);
        assert!(first.advanced);
        assert_eq!(store.value(KEY_CURRENT_DAY).as_deref(), Some("2024-01-02"));

        let forced = rotation.force_rotate(&store, noon(2024, 1, 2)).await.unwrap();
        assert_eq!(forced.lesson_id, 1);
        assert_eq!(store.value(KEY_CURRENT_LESSON_ID).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn advances_exactly_once_per_day() {
        let store = TestStore::with_lessons(vec![10, 20, 30]);
        let rotation = DailyRotation::default();

        let mut seen = Vec::new();
        for day in 1..=4 {
            for _ in 0..3 {
                let outcome = rotation
                    .today_lesson(&store, noon(2024, 3, day))
                    .await
                    .unwrap();
                seen.push(outcome.lesson_id);
            }
        }

        assert_eq!(seen, vec![10, 10, 10, 20, 20, 20, 30, 30, 30, 10, 10, 10]);
    }

    #[tokio::test]
    async fn first_read_initializes_state() {
        let store = TestStore::with_lessons(vec![4, 2]);
        let rotation = DailyRotation::default();

        let outcome = rotation.today_lesson(&store, noon(2024, 5, 5)).await.unwrap();

        assert_eq!(outcome.lesson_id, 2);
        assert!(outcome.advanced);
        assert_eq!(store.value(KEY_CURRENT_LESSON_ID).as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn garbage_pointer_restarts_from_first_lesson() {
        let store = TestStore::with_lessons(vec![1, 2]);
        store.put(KEY_CURRENT_LESSON_ID, "not-a-number");
        store.put(KEY_CURRENT_DAY, "2024-05-05");
        let rotation = DailyRotation::default();

        let outcome = rotation.today_lesson(&store, noon(2024, 5, 5)).await.unwrap();

        assert_eq!(outcome.lesson_id, 1);
        assert!(outcome.advanced);
    }

    #[tokio::test]
    async fn empty_catalog_is_a_configuration_error() {
        let store = TestStore::with_lessons(vec![]);
        let rotation = DailyRotation::default();

        let result = rotation.today_lesson(&store, noon(2024, 1, 1)).await;

        assert_matches!(result, Err(CoreError::Configuration(msg)) if msg == "no active lessons");
        assert_eq!(store.value(KEY_CURRENT_DAY), None);
    }
}
