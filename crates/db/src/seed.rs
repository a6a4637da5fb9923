//! Starter catalog inserted on first boot.

use crate::models::lesson::CreateLesson;
use crate::store::{LessonStore, Store, StoreError};

/// `(title, track, content, prompt_template)` for each starter lesson.
const STARTER_LESSONS: [(&str, &str, &str, &str); 4] = [
    (
        "Prompting 101: Roles & Constraints",
        "general",
        "Write a role, goal, constraints, and steps.",
        "You are a prompt engineering tutor. Improve the following prompt by adding a role, a goal, constraints and steps:",
    ),
    (
        "Marketing: 5 Ad Variants Fast",
        "marketing",
        "Generate 5 paid ad variants using a brand voice.",
        "You are a performance marketer. Write 5 ad variants in the brand voice described below:",
    ),
    (
        "HR: Structured Interview Rubric",
        "hr",
        "Create a rubric with 4 competencies and behavior questions.",
        "You are an HR partner. Draft a structured interview rubric with 4 competencies for:",
    ),
    (
        "Finance: Cashflow Summary",
        "finance",
        "Summarize last 30 days transactions into 5 insights.",
        "You are a finance analyst. Summarize these transactions into 5 cashflow insights:",
    ),
];

/// Insert the starter lessons when the catalog is empty.
///
/// Returns the number of lessons inserted (`0` when the catalog already had rows).
pub async fn seed_starter_lessons(store: &dyn Store) -> Result<usize, StoreError> {
    if store.count_lessons().await? > 0 {
        tracing::debug!("Lesson catalog already populated, skipping seed");
        return Ok(0);
    }

    for (index, (title, track, content, prompt_template)) in STARTER_LESSONS.iter().enumerate() {
        let input = CreateLesson {
            title: (*title).to_string(),
            track: (*track).to_string(),
            content: (*content).to_string(),
            prompt_template: (*prompt_template).to_string(),
            sort_order: Some(index as i32),
            is_active: Some(true),
        };
        store.insert_lesson(&input).await?;
    }

    tracing::info!(count = STARTER_LESSONS.len(), "Seeded starter lessons");
    Ok(STARTER_LESSONS.len())
}
