use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One poll-cycle view of a token's market state. Produced by the data
/// boundary, never mutated by the core; recreated on every fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub address: String,
    pub name: String,
    pub symbol: String,
    /// Spot price in USD, non-negative.
    pub price: Decimal,
    pub volume_24h: Decimal,
    /// 24h price change in percent.
    pub price_change_24h: Decimal,
    /// Pool liquidity in USD. May legitimately be zero for dead pools;
    /// ratio consumers must guard the division.
    pub liquidity_usd: Decimal,
    pub price_change_1h: Option<Decimal>,
    pub volume_1h: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub buys_24h: u32,
    pub sells_24h: u32,
    pub pair_created_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    pub fn txns_24h(&self) -> u32 {
        self.buys_24h + self.sells_24h
    }

    /// Pair age in whole hours, when the creation time is known.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<i64> {
        self.pair_created_at.map(|t| (now - t).num_hours())
    }
}
