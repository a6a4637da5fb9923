//! PromptCademy domain logic.
//!
//! Everything in this crate is storage- and transport-agnostic: daily lesson
//! rotation, progress bookkeeping, coach score normalization and the
//! gamification rules (XP, streaks, badges). Persistence is reached through
//! the [`rotation::RotationStore`] seam so the logic can run against
//! PostgreSQL in production and an in-memory store in tests.

pub mod error;
pub mod gamification;
pub mod progress;
pub mod roles;
pub mod rotation;
pub mod scoring;
pub mod types;
