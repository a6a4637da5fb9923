//! XP, levels, daily check-in streaks and badges.

use chrono::NaiveDate;
use serde::Serialize;

use crate::scoring::HIGH_SCORE_THRESHOLD;

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// XP needed to climb one level.
pub const XP_PER_LEVEL: i64 = 500;

/// Level for an XP balance. Everyone starts at level 1.
pub fn level_for_xp(xp: i64) -> i64 {
    xp.max(0) / XP_PER_LEVEL + 1
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// Result of a daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    pub streak: i32,
    pub day: NaiveDate,
    /// `false` when the learner had already checked in today.
    pub changed: bool,
}

/// Apply a check-in on `today`.
///
/// Same day: no change. Consecutive day: streak + 1. Any gap (or first
/// check-in): streak restarts at 1.
pub fn check_in(streak: i32, last_check_in: Option<NaiveDate>, today: NaiveDate) -> CheckIn {
    match last_check_in {
        Some(last) if last == today => CheckIn {
            streak,
            day: today,
            changed: false,
        },
        Some(last) if last.succ_opt() == Some(today) => CheckIn {
            streak: streak + 1,
            day: today,
            changed: true,
        },
        _ => CheckIn {
            streak: 1,
            day: today,
            changed: true,
        },
    }
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// A badge a learner can earn once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDef {
    pub id: &'static str,
    pub label: &'static str,
}

pub const BADGE_FIRST_LESSON: BadgeDef = BadgeDef {
    id: "first-lesson",
    label: "First lesson completed",
};

pub const BADGE_HIGH_SCORER: BadgeDef = BadgeDef {
    id: "high-scorer",
    label: "Scored 80+ with the coach",
};

pub const BADGE_WEEK_STREAK: BadgeDef = BadgeDef {
    id: "week-streak",
    label: "Seven-day streak",
};

/// Consecutive check-ins needed for [`BADGE_WEEK_STREAK`].
pub const WEEK_STREAK_DAYS: i32 = 7;

/// Badges unlocked by a completed-lesson count.
pub fn badges_for_completions(completed: i64) -> Vec<BadgeDef> {
    if completed >= 1 {
        vec![BADGE_FIRST_LESSON]
    } else {
        Vec::new()
    }
}

/// Badges unlocked by a coach score.
pub fn badges_for_score(total: i64) -> Vec<BadgeDef> {
    if total >= HIGH_SCORE_THRESHOLD {
        vec![BADGE_HIGH_SCORER]
    } else {
        Vec::new()
    }
}

/// Badges unlocked by a streak length.
pub fn badges_for_streak(streak: i32) -> Vec<BadgeDef> {
    if streak >= WEEK_STREAK_DAYS {
        vec![BADGE_WEEK_STREAK]
    } else {
        Vec::new()
    }
}
