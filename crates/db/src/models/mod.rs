//! Row models and DTOs, one module per table family.

pub mod lesson;
pub mod progress;
pub mod stats;
pub mod user;
