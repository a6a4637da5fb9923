//! Lesson entity model and DTOs.
//!
//! Lessons are created at seed time and never edited in-app.

use promptcademy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub title: String,
    pub track: String,
    pub content: String,
    pub prompt_template: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for seeding a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub track: String,
    pub content: String,
    pub prompt_template: String,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
