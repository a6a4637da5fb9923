//! Request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod coach;
pub mod health;
pub mod lessons;
pub mod progress;
pub mod stats;
