use std::sync::Arc;

use promptcademy_coach::CoachClient;
use promptcademy_core::error::CoreError;
use promptcademy_core::rotation::DailyRotation;
use promptcademy_db::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is `Copy`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence: PostgreSQL in production, in-memory otherwise.
    pub store: Arc<dyn Store>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Chat-completion client for scoring and the playground.
    pub coach: Arc<CoachClient>,
    /// Daily lesson rotation in the configured reference offset.
    pub rotation: DailyRotation,
}

impl AppState {
    /// Assemble the state, deriving the rotation from the configured offset.
    pub fn new(
        store: Arc<dyn Store>,
        config: ServerConfig,
        coach: CoachClient,
    ) -> Result<Self, CoreError> {
        let rotation = DailyRotation::from_offset_minutes(config.lesson_utc_offset_minutes)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            coach: Arc::new(coach),
            rotation,
        })
    }
}
