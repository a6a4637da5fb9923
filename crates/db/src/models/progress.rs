use promptcademy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A learner's progress on one lesson, joined with the lesson's title and track.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProgressItem {
    pub lesson_id: DbId,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub title: String,
    pub track: String,
}
