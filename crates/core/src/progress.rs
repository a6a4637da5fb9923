//! Per-user lesson progress rules.
//!
//! Progress rows are keyed by `(user_id, lesson_id)` and upserted on every
//! submission. The completion timestamp is monotonic: once set, only a new
//! `completed` status replaces it, and no other status clears it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Lifecycle state of a lesson for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Stored/wire representation. Must match the `progress.status` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown progress status '{other}'. Expected one of: not_started, in_progress, completed"
            ))),
        }
    }
}

/// Completion timestamp after applying `status` at `now`.
///
/// `completed` stamps `now`; every other status keeps whatever was there.
pub fn next_completed_at(
    existing: Option<Timestamp>,
    status: ProgressStatus,
    now: Timestamp,
) -> Option<Timestamp> {
    if status.is_completed() {
        Some(now)
    } else {
        existing
    }
}

/// Aggregate counts over all of a learner's progress rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed: i64,
    pub total: i64,
}

impl ProgressSummary {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ProgressStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut acc, status| {
                acc.total += 1;
                if status.is_completed() {
                    acc.completed += 1;
                }
                acc
            })
    }
}

/// Listing order for progress entries: `completed_at` descending with
/// nulls last, then `lesson_id` descending.
pub fn listing_order(
    a: (Option<Timestamp>, DbId),
    b: (Option<Timestamp>, DbId),
) -> Ordering {
    let by_time = match (a.0, b.0) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time.then_with(|| b.1.cmp(&a.1))
}

/// Whole-number completion percentage, `0` for an empty catalog.
pub fn completion_percent(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}
