use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use metrics::gauge;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::config::ExitRules;
use crate::errors::EngineError;
use crate::models::{MarketSnapshot, Notification, NotificationKind, Position, Priority};
use crate::notify::NotificationBus;

const STOP_LOSS_TAG: &str = "stop_loss";

/// In-memory registry of open simulated positions, keyed by token
/// address.
///
/// All mutation runs under a single lock, which serializes concurrent
/// price ticks per token and keeps the trailing-stop ratchet and
/// fire-once alert set consistent. Notifications are published after the
/// lock is released so subscribers may call back into the book.
pub struct PositionBook {
    exit: ExitRules,
    bus: Arc<NotificationBus>,
    positions: Mutex<HashMap<String, Position>>,
}

impl PositionBook {
    pub fn new(exit: ExitRules, bus: Arc<NotificationBus>) -> Self {
        Self {
            exit,
            bus,
            positions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a position at the snapshot's current price. The stop,
    /// trailing stop and take-profit ladder are derived from the entry
    /// price by the configured exit rules. Re-opening an address
    /// replaces the previous position.
    pub fn open(&self, token: &MarketSnapshot, size: Decimal) -> Result<Position, EngineError> {
        if size <= Decimal::ZERO {
            return Err(EngineError::InvalidSize(size));
        }
        if token.price <= Decimal::ZERO {
            return Err(EngineError::InvalidPrice(token.price));
        }

        let entry = token.price;
        let position = Position {
            token_address: token.address.clone(),
            symbol: token.symbol.clone(),
            entry_price: entry,
            size,
            stop_loss: entry * self.exit.initial_stop_multiplier,
            trailing_stop: entry * (Decimal::ONE - self.exit.trailing_stop_fraction),
            targets: self
                .exit
                .take_profit_levels
                .iter()
                .map(|gain| entry * (Decimal::ONE + gain))
                .collect(),
            current_price: entry,
            highest_price: entry,
            lowest_price: entry,
            pnl: Decimal::ZERO,
            pnl_percent: Decimal::ZERO,
            entry_time: Utc::now(),
            fired_alerts: HashSet::new(),
        };

        let open_count;
        {
            let mut positions = self.positions.lock();
            if positions.insert(token.address.clone(), position.clone()).is_some() {
                tracing::warn!(address = %token.address, "Replaced an existing open position");
            }
            open_count = positions.len();
        }
        gauge!("open_positions").set(open_count as f64);

        tracing::info!(
            address = %token.address,
            entry = %entry,
            size = %size,
            "Position opened"
        );
        self.bus.publish(Notification::new(
            NotificationKind::Entry,
            format!("Entered {} at ${} with ${}", token.symbol, entry, size),
            Priority::Medium,
        ));

        Ok(position)
    }

    /// Apply a price tick to one position.
    ///
    /// Updates P&L and the high/low watermarks, ratchets the trailing
    /// stop upward (never downward), fires each take-profit alert at
    /// most once, and on a stop-loss breach fires the alert once and
    /// closes the position. Ticking an unknown address is a no-op.
    pub fn tick(&self, address: &str, price: Decimal) -> Result<(), EngineError> {
        if price <= Decimal::ZERO {
            return Err(EngineError::InvalidPrice(price));
        }

        let mut pending = Vec::new();
        let mut open_count = None;

        {
            let mut positions = self.positions.lock();
            let Some(position) = positions.get_mut(address) else {
                return Ok(());
            };

            position.current_price = price;
            position.highest_price = position.highest_price.max(price);
            position.lowest_price = position.lowest_price.min(price);
            position.pnl = position.pnl_at(price);
            position.pnl_percent = if position.entry_price.is_zero() {
                Decimal::ZERO
            } else {
                (price - position.entry_price) / position.entry_price * Decimal::ONE_HUNDRED
            };

            // Monotonic ratchet: the trailing stop follows the highest
            // observed price and never moves back down.
            let candidate =
                position.highest_price * (Decimal::ONE - self.exit.trailing_stop_fraction);
            if candidate > position.trailing_stop {
                position.trailing_stop = candidate;
            }

            let targets = position.targets.clone();
            for (index, target) in targets.iter().enumerate() {
                let tag = format!("target_{index}");
                if price >= *target && position.fired_alerts.insert(tag) {
                    pending.push(Notification::new(
                        NotificationKind::Alert,
                        format!(
                            "Take profit target {} reached for {} at ${price}",
                            index + 1,
                            position.symbol
                        ),
                        Priority::Medium,
                    ));
                }
            }

            let stop_hit = price <= position.stop_loss
                && position.fired_alerts.insert(STOP_LOSS_TAG.to_string());
            let symbol = position.symbol.clone();

            // Automatic exit path: a stop breach closes the position.
            if stop_hit {
                pending.push(Notification::new(
                    NotificationKind::Alert,
                    format!("Stop loss hit for {symbol} at ${price}"),
                    Priority::High,
                ));
                if let Some(closed) = positions.remove(address) {
                    pending.push(exit_notification(&closed));
                }
                open_count = Some(positions.len());
            }
        }

        if let Some(count) = open_count {
            gauge!("open_positions").set(count as f64);
        }
        for notification in pending {
            self.bus.publish(notification);
        }
        Ok(())
    }

    /// Close a position explicitly. Closing an address with no open
    /// position is a no-op.
    pub fn close(&self, address: &str) -> Option<Position> {
        let (closed, open_count) = {
            let mut positions = self.positions.lock();
            let closed = positions.remove(address);
            (closed, positions.len())
        };

        let closed = closed?;
        gauge!("open_positions").set(open_count as f64);
        tracing::info!(
            address = %address,
            pnl = %closed.pnl,
            pnl_percent = %closed.pnl_percent,
            "Position closed"
        );
        self.bus.publish(exit_notification(&closed));
        Some(closed)
    }

    pub fn get(&self, address: &str) -> Option<Position> {
        self.positions.lock().get(address).cloned()
    }

    pub fn get_all(&self) -> Vec<Position> {
        self.positions.lock().values().cloned().collect()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.positions.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.positions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.lock().is_empty()
    }
}

fn exit_notification(position: &Position) -> Notification {
    Notification::new(
        NotificationKind::Exit,
        format!(
            "Closed {} position: P&L ${} ({}%)",
            position.symbol,
            position.pnl.round_dp(2),
            position.pnl_percent.round_dp(2)
        ),
        Priority::Medium,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
