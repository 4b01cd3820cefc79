use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ratios derived from one snapshot. Ephemeral: recomputed every fetch
/// cycle, never carried across polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Fraction of 24h transactions that are buys. 0 when there were no
    /// transactions at all.
    pub buy_ratio: Decimal,
    /// 24h volume over pool liquidity. 0 when liquidity is zero.
    pub volume_to_liquidity: Decimal,
    /// Momentum proxy comparing the last hour's move against the 24h
    /// hourly average, clamped to [-100, 100]. A heuristic, not a z-score.
    pub hourly_acceleration: Decimal,
    /// Last hour's volume extrapolated to 24h, over actual 24h volume.
    pub volume_acceleration: Decimal,
    /// 24h volume divided by transaction count. 0 when there were no
    /// transactions.
    pub avg_transaction_usd: Decimal,
}
