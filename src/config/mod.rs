use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// All tunable thresholds for the evaluation engine, consolidated into one
/// validated table supplied at startup. No runtime mutation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub safety: SafetyThresholds,
    pub signals: SignalThresholds,
    pub risk: RiskScoring,
    pub entry: EntryRules,
    pub exit: ExitRules,
    pub smart_money: SmartMoneyRules,
    pub watchlist: WatchlistDefaults,
    pub sessions: TradingSessions,
}

impl EngineConfig {
    /// Reject internally inconsistent threshold tables before the engine
    /// is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tranche_sum =
            self.entry.initial_tranche + self.entry.secondary_tranche + self.entry.final_tranche;
        if tranche_sum != Decimal::ONE {
            return Err(ConfigError::TrancheSplitInvalid(tranche_sum));
        }

        if self.entry.support_multiplier >= Decimal::ONE
            || self.entry.resistance_multiplier <= Decimal::ONE
        {
            return Err(ConfigError::PriceTargetsInverted {
                support: self.entry.support_multiplier,
                resistance: self.entry.resistance_multiplier,
            });
        }

        if self.exit.initial_stop_multiplier >= Decimal::ONE {
            return Err(ConfigError::StopAboveEntry(self.exit.initial_stop_multiplier));
        }

        let ladder = &self.exit.take_profit_levels;
        let ascending = ladder.windows(2).all(|w| w[0] < w[1]);
        if ladder.is_empty() || !ascending {
            return Err(ConfigError::TakeProfitLadderInvalid);
        }

        if self.safety.avoid_warning_count == 0 {
            return Err(ConfigError::AvoidGateZero);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Safety
// ---------------------------------------------------------------------------

/// Static safety floors and ceilings applied to every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyThresholds {
    pub min_liquidity_usd: Decimal,
    pub healthy_liquidity_usd: Decimal,
    pub min_volume_24h: Decimal,
    pub healthy_volume_24h: Decimal,
    pub min_txns_24h: u32,
    /// Vol/liq ratios above this look like wash trading.
    pub max_vol_liq_ratio: Decimal,
    pub min_buy_ratio: Decimal,
    /// 24h price moves beyond this are treated as a spike.
    pub max_price_change_pct: Decimal,
    pub min_viable_market_cap: Decimal,
    /// Above this cap the easy upside is gone.
    pub sweet_spot_market_cap: Decimal,
    /// Average trade larger than this fraction of liquidity reads as
    /// whale-dominated flow.
    pub whale_tx_impact: Decimal,
    pub whale_vol_liq_mult: Decimal,
    /// Estimated single-wallet share of the pool above which the token
    /// counts as concentrated. Snapshots carry no holder breakdown, so
    /// the estimate works off average trade size.
    pub max_wallet_concentration: Decimal,
    /// Independent warnings required to classify a token Avoid.
    pub avoid_warning_count: usize,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            min_liquidity_usd: Decimal::from(100_000),
            healthy_liquidity_usd: Decimal::from(500_000),
            min_volume_24h: Decimal::from(500_000),
            healthy_volume_24h: Decimal::from(750_000),
            min_txns_24h: 150,
            max_vol_liq_ratio: Decimal::from(10),
            min_buy_ratio: Decimal::new(4, 1),        // 0.4
            max_price_change_pct: Decimal::from(150),
            min_viable_market_cap: Decimal::from(500_000),
            sweet_spot_market_cap: Decimal::from(100_000_000),
            whale_tx_impact: Decimal::new(5, 2),      // 0.05
            whale_vol_liq_mult: Decimal::from(3),
            max_wallet_concentration: Decimal::new(1, 1), // 0.10
            avoid_warning_count: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Signal bands
// ---------------------------------------------------------------------------

/// One row of the classifier decision table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBand {
    pub buy_ratio: Decimal,
    pub vol_liq_ratio: Decimal,
    pub acceleration: Decimal,
}

/// Threshold bands for the buy/sell decision table. Buy bands require all
/// three metrics; sell bands trigger on any one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub strong_buy: SignalBand,
    pub moderate_buy: SignalBand,
    pub strong_sell: SignalBand,
    pub moderate_sell: SignalBand,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy: SignalBand {
                buy_ratio: Decimal::new(65, 2),      // 0.65
                vol_liq_ratio: Decimal::new(25, 1),  // 2.5
                acceleration: Decimal::new(15, 1),   // 1.5
            },
            moderate_buy: SignalBand {
                buy_ratio: Decimal::new(55, 2),      // 0.55
                vol_liq_ratio: Decimal::new(15, 1),  // 1.5
                acceleration: Decimal::new(12, 1),   // 1.2
            },
            strong_sell: SignalBand {
                buy_ratio: Decimal::new(35, 2),      // 0.35
                vol_liq_ratio: Decimal::new(4, 1),   // 0.4
                acceleration: Decimal::new(4, 1),    // 0.4
            },
            moderate_sell: SignalBand {
                buy_ratio: Decimal::new(45, 2),      // 0.45
                vol_liq_ratio: Decimal::new(6, 1),   // 0.6
                acceleration: Decimal::new(6, 1),    // 0.6
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Risk scoring
// ---------------------------------------------------------------------------

/// Penalties and bonuses applied on top of the base-50 composite risk
/// score. Band thresholds come from `SafetyThresholds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoring {
    pub low_cap_penalty: i64,
    pub large_cap_bonus: i64,
    pub low_liquidity_penalty: i64,
    pub deep_liquidity_bonus: i64,
    pub hot_volume_penalty: i64,
    pub calm_volume_bonus: i64,
    /// Vol/liq ratios below this count as calm trading.
    pub calm_vol_liq_ratio: Decimal,
    pub thin_txns_penalty: i64,
    pub active_txns_bonus: i64,
}

impl Default for RiskScoring {
    fn default() -> Self {
        Self {
            low_cap_penalty: 20,
            large_cap_bonus: 10,
            low_liquidity_penalty: 15,
            deep_liquidity_bonus: 10,
            hot_volume_penalty: 15,
            calm_volume_bonus: 5,
            calm_vol_liq_ratio: Decimal::from(3),
            thin_txns_penalty: 15,
            active_txns_bonus: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRules {
    pub min_liquidity_usd: Decimal,
    pub min_buy_ratio: Decimal,
    /// Buy ratio at which a full-conviction entry is preferred over
    /// scaling in.
    pub strong_buy_ratio: Decimal,
    pub max_volatility_pct: Decimal,
    pub resistance_multiplier: Decimal,
    pub support_multiplier: Decimal,
    pub min_risk_reward: Decimal,
    /// Position cap as a fraction of pool liquidity.
    pub max_liquidity_fraction: Decimal,
    pub max_position_usd: Decimal,
    pub initial_tranche: Decimal,
    pub secondary_tranche: Decimal,
    pub final_tranche: Decimal,
    /// Pullback from entry that triggers the secondary tranche.
    pub pullback_pct: Decimal,
}

impl Default for EntryRules {
    fn default() -> Self {
        Self {
            min_liquidity_usd: Decimal::from(500_000),
            min_buy_ratio: Decimal::new(65, 2),        // 0.65
            strong_buy_ratio: Decimal::new(75, 2),     // 0.75
            max_volatility_pct: Decimal::from(100),
            resistance_multiplier: Decimal::new(125, 2), // 1.25
            support_multiplier: Decimal::new(85, 2),     // 0.85
            min_risk_reward: Decimal::new(15, 1),        // 1.5
            max_liquidity_fraction: Decimal::new(5, 3),  // 0.005
            max_position_usd: Decimal::from(10_000),
            initial_tranche: Decimal::new(4, 1),         // 0.4
            secondary_tranche: Decimal::new(3, 1),       // 0.3
            final_tranche: Decimal::new(3, 1),           // 0.3
            pullback_pct: Decimal::from(5),
        }
    }
}

// ---------------------------------------------------------------------------
// Exit rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRules {
    /// Initial stop as a multiple of entry price.
    pub initial_stop_multiplier: Decimal,
    /// Trailing stop distance below the highest observed price.
    pub trailing_stop_fraction: Decimal,
    /// Take-profit ladder as gains over entry, ascending.
    pub take_profit_levels: Vec<Decimal>,
}

impl Default for ExitRules {
    fn default() -> Self {
        Self {
            initial_stop_multiplier: Decimal::new(93, 2), // 0.93
            trailing_stop_fraction: Decimal::new(5, 2),   // 0.05
            take_profit_levels: vec![
                Decimal::new(20, 2), // +20%
                Decimal::new(35, 2), // +35%
                Decimal::new(50, 2), // +50%
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Smart money
// ---------------------------------------------------------------------------

/// Informed-accumulation heuristic: large average trades plus a high buy
/// ratio raise classifier confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartMoneyRules {
    pub min_avg_transaction_usd: Decimal,
    pub min_buy_ratio: Decimal,
    /// Confidence is raised (never lowered) to this value.
    pub boosted_confidence: u8,
    /// Single trades above this are flagged as whale-sized.
    pub large_tx_usd: Decimal,
}

impl Default for SmartMoneyRules {
    fn default() -> Self {
        Self {
            min_avg_transaction_usd: Decimal::from(1_000),
            min_buy_ratio: Decimal::new(7, 1), // 0.7
            boosted_confidence: 90,
            large_tx_usd: Decimal::from(50_000),
        }
    }
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistDefaults {
    /// Band for the two alerts seeded on add: price × (1 ± band).
    pub default_alert_band: Decimal,
}

impl Default for WatchlistDefaults {
    fn default() -> Self {
        Self {
            default_alert_band: Decimal::new(1, 1), // 0.10
        }
    }
}

// ---------------------------------------------------------------------------
// Trading sessions
// ---------------------------------------------------------------------------

/// UTC trading windows used for the session insight. Hours are inclusive
/// on both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSessions {
    pub peak_hours: Vec<(u32, u32)>,
    pub quiet_hours: Vec<(u32, u32)>,
}

impl Default for TradingSessions {
    fn default() -> Self {
        Self {
            peak_hours: vec![(13, 21), (1, 9)],  // US, Asia
            quiet_hours: vec![(22, 23), (10, 12)],
        }
    }
}

impl TradingSessions {
    pub fn is_peak(&self, hour: u32) -> bool {
        self.peak_hours.iter().any(|&(s, e)| hour >= s && hour <= e)
    }

    pub fn is_quiet(&self, hour: u32) -> bool {
        self.quiet_hours.iter().any(|&(s, e)| hour >= s && hour <= e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tranche_split_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.entry.initial_tranche = Decimal::new(5, 1); // 0.5 + 0.3 + 0.3 = 1.1
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TrancheSplitInvalid(_))
        ));
    }

    #[test]
    fn test_take_profit_ladder_must_ascend() {
        let mut config = EngineConfig::default();
        config.exit.take_profit_levels = vec![Decimal::new(50, 2), Decimal::new(20, 2)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TakeProfitLadderInvalid)
        ));
    }

    #[test]
    fn test_session_windows() {
        let sessions = TradingSessions::default();
        assert!(sessions.is_peak(14)); // US hours
        assert!(sessions.is_peak(3));  // Asia hours
        assert!(sessions.is_quiet(11));
        assert!(!sessions.is_peak(11));
    }
}
