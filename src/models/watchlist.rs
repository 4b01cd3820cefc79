use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MarketSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

/// A one-shot price alert. Once `triggered` is set it never rearms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub target_price: Decimal,
    pub direction: AlertDirection,
    pub triggered: bool,
}

impl PriceAlert {
    pub fn new(target_price: Decimal, direction: AlertDirection) -> Self {
        Self {
            target_price,
            direction,
            triggered: false,
        }
    }

    /// Whether the given price satisfies this alert's condition.
    pub fn matches(&self, price: Decimal) -> bool {
        match self.direction {
            AlertDirection::Above => price >= self.target_price,
            AlertDirection::Below => price <= self.target_price,
        }
    }
}

/// A tracked token with its alerts and a free-text note. Owned
/// exclusively by the `Watchlist` registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistItem {
    /// Market state captured at add time.
    pub token: MarketSnapshot,
    pub added_at: DateTime<Utc>,
    pub alerts: Vec<PriceAlert>,
    pub note: String,
}
