use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open simulated position, owned exclusively by the `PositionBook`.
///
/// Created on "enter trade", destroyed on explicit close or an automatic
/// stop/final-target exit. `trailing_stop` only ever ratchets upward;
/// `fired_alerts` guarantees each threshold notification fires at most
/// once over the position's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub token_address: String,
    pub symbol: String,
    pub entry_price: Decimal,
    /// Position size in USD.
    pub size: Decimal,
    pub stop_loss: Decimal,
    pub trailing_stop: Decimal,
    /// Take-profit price levels, ascending.
    pub targets: Vec<Decimal>,
    pub current_price: Decimal,
    pub highest_price: Decimal,
    pub lowest_price: Decimal,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub entry_time: DateTime<Utc>,
    /// Tags of alerts that have already fired ("stop_loss", "target_0", ...).
    pub fired_alerts: HashSet<String>,
}

impl Position {
    /// Unrealized P&L at the given price.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        if self.entry_price.is_zero() {
            return Decimal::ZERO;
        }
        (price - self.entry_price) / self.entry_price * self.size
    }
}
