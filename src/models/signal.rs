use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terminal labels of the signal decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    ModerateBuy,
    Hold,
    ConsiderSell,
    StrongSell,
    /// Failed the safety gate, not tradeable regardless of momentum.
    Avoid,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::ModerateBuy => "MODERATE_BUY",
            Signal::Hold => "HOLD",
            Signal::ConsiderSell => "CONSIDER_SELL",
            Signal::StrongSell => "STRONG_SELL",
            Signal::Avoid => "AVOID",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction tag for a single indicator, banded independently of the
/// overall signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub value: Decimal,
    pub trend: Trend,
}

/// The indicator trio shown alongside each token card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub buy_pressure: Indicator,
    pub volume: Indicator,
    pub price_movement: Indicator,
}

/// Composite evaluation output attached to a token for one fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub signal: Signal,
    /// 0–100.
    pub confidence: u8,
    /// Display-ordered explanations, assembled section by section.
    pub reasons: Vec<String>,
    /// Composite risk score, 0 (safest) to 100.
    pub risk_score: u8,
    pub indicators: IndicatorSet,
}
