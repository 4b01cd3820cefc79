use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::config::WatchlistDefaults;
use crate::errors::EngineError;
use crate::models::{
    AlertDirection, MarketSnapshot, Notification, NotificationKind, PriceAlert, Priority,
    WatchlistItem,
};
use crate::notify::NotificationBus;

/// In-memory registry of tracked tokens with one-shot price alerts.
///
/// Alerts latch: once triggered they never rearm and never notify
/// again. Duplicate alerts are allowed. Mutation is serialized behind a
/// single lock; notifications go out after the lock is released.
pub struct Watchlist {
    defaults: WatchlistDefaults,
    bus: Arc<NotificationBus>,
    items: Mutex<HashMap<String, WatchlistItem>>,
}

impl Watchlist {
    pub fn new(defaults: WatchlistDefaults, bus: Arc<NotificationBus>) -> Self {
        Self {
            defaults,
            bus,
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Track a token, seeding one alert a band above the current price
    /// and one a band below. Re-adding a tracked token starts over with
    /// fresh alerts.
    pub fn add(&self, token: &MarketSnapshot, note: impl Into<String>) -> WatchlistItem {
        let band = self.defaults.default_alert_band;
        let item = WatchlistItem {
            token: token.clone(),
            added_at: Utc::now(),
            alerts: vec![
                PriceAlert::new(token.price * (Decimal::ONE + band), AlertDirection::Above),
                PriceAlert::new(token.price * (Decimal::ONE - band), AlertDirection::Below),
            ],
            note: note.into(),
        };

        self.items.lock().insert(token.address.clone(), item.clone());
        tracing::info!(address = %token.address, "Token added to watchlist");
        item
    }

    /// Append an alert. No dedup: identical alerts are kept and each
    /// fires independently. Unknown addresses are ignored.
    pub fn add_alert(&self, address: &str, target_price: Decimal, direction: AlertDirection) {
        let mut items = self.items.lock();
        match items.get_mut(address) {
            Some(item) => {
                item.alerts.push(PriceAlert::new(target_price, direction));
            }
            None => {
                tracing::debug!(address = %address, "Alert for a token not on the watchlist");
            }
        }
    }

    /// Evaluate every untriggered alert against the new price. An alert
    /// whose condition holds is latched and notifies exactly once;
    /// latched alerts are never evaluated again.
    pub fn tick(&self, address: &str, price: Decimal) -> Result<(), EngineError> {
        if price <= Decimal::ZERO {
            return Err(EngineError::InvalidPrice(price));
        }

        let mut pending = Vec::new();
        {
            let mut items = self.items.lock();
            let Some(item) = items.get_mut(address) else {
                return Ok(());
            };

            for alert in item.alerts.iter_mut().filter(|a| !a.triggered) {
                if alert.matches(price) {
                    alert.triggered = true;
                    pending.push(Notification::new(
                        NotificationKind::Alert,
                        format!(
                            "{} price {} {} (now ${price})",
                            item.token.symbol, alert.direction, alert.target_price
                        ),
                        Priority::Medium,
                    ));
                }
            }
        }

        for notification in pending {
            self.bus.publish(notification);
        }
        Ok(())
    }

    pub fn remove(&self, address: &str) -> bool {
        let removed = self.items.lock().remove(address).is_some();
        if removed {
            tracing::info!(address = %address, "Token removed from watchlist");
        }
        removed
    }

    /// Overwrite the note. The previous text is not kept.
    pub fn set_note(&self, address: &str, note: impl Into<String>) -> bool {
        let mut items = self.items.lock();
        match items.get_mut(address) {
            Some(item) => {
                item.note = note.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, address: &str) -> Option<WatchlistItem> {
        self.items.lock().get(address).cloned()
    }

    pub fn get_all(&self) -> Vec<WatchlistItem> {
        self.items.lock().values().cloned().collect()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.items.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
