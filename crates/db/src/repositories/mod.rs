//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod app_state_repo;
pub mod badge_repo;
pub mod lesson_repo;
pub mod progress_repo;
pub mod stats_repo;
pub mod user_repo;

pub use app_state_repo::AppStateRepo;
pub use badge_repo::BadgeRepo;
pub use lesson_repo::LessonRepo;
pub use progress_repo::ProgressRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
