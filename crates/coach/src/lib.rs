//! Chat-completion client for the AI coach and the lesson playground.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Scoring
//! replies are normalized by [`promptcademy_core::scoring::normalize_reply`]
//! so callers always receive a well-formed [`promptcademy_core::scoring::ScoreResult`].

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;

pub use client::CoachClient;
pub use config::CoachConfig;
pub use error::CoachError;
