pub mod config;
pub mod data;
pub mod errors;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod services;
pub mod tracking;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::errors::ConfigError;
use crate::intelligence::TokenEvaluation;
use crate::models::MarketSnapshot;
use crate::notify::NotificationBus;
use crate::tracking::{PositionBook, Watchlist};

/// The engine context: validated configuration, the notification bus,
/// and the two stateful registries.
///
/// Constructed once at startup and passed by reference to whatever
/// consumes it; there are no global singletons, so tests can run
/// isolated engines side by side.
pub struct Engine {
    config: EngineConfig,
    pub bus: Arc<NotificationBus>,
    pub positions: PositionBook,
    pub watchlist: Watchlist,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = NotificationBus::new();
        Ok(Self {
            positions: PositionBook::new(config.exit.clone(), Arc::clone(&bus)),
            watchlist: Watchlist::new(config.watchlist.clone(), Arc::clone(&bus)),
            config,
            bus,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a snapshot against the current clock.
    pub fn evaluate(&self, snapshot: &MarketSnapshot) -> TokenEvaluation {
        self.evaluate_at(snapshot, Utc::now())
    }

    /// Evaluate with an explicit clock, for deterministic tests of the
    /// session and maturity insights.
    pub fn evaluate_at(&self, snapshot: &MarketSnapshot, now: DateTime<Utc>) -> TokenEvaluation {
        intelligence::evaluate(&self.config, snapshot, now)
    }
}
