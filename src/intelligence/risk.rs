use rust_decimal::Decimal;

use crate::config::{RiskScoring, SafetyThresholds};
use crate::models::{DerivedMetrics, MarketSnapshot};

/// Composite risk output: a 0-100 score plus one factor line per
/// adjustment that applied.
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: Vec<String>,
}

const BASE_SCORE: i64 = 50;

/// Score risk from a neutral base of 50. Four independent adjustments
/// (market-cap band, liquidity band, volume pattern, transaction
/// pattern) each add a penalty or subtract a bonus, then the total is
/// clamped to [0, 100]. Higher means riskier.
pub fn score_risk(
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
    thresholds: &SafetyThresholds,
    weights: &RiskScoring,
) -> RiskAssessment {
    let mut score = BASE_SCORE;
    let mut factors = Vec::new();

    // Market-cap band. An unknown cap is treated like a micro cap.
    match snapshot.market_cap {
        Some(cap) if cap >= thresholds.min_viable_market_cap => {
            if cap > thresholds.sweet_spot_market_cap {
                score -= weights.large_cap_bonus;
                factors.push(format!(
                    "Market cap ${cap} above the sweet spot, established float"
                ));
            }
        }
        Some(cap) => {
            score += weights.low_cap_penalty;
            factors.push(format!(
                "Market cap ${cap} below ${} viability floor",
                thresholds.min_viable_market_cap
            ));
        }
        None => {
            score += weights.low_cap_penalty;
            factors.push("Market cap unknown".into());
        }
    }

    // Liquidity band.
    if snapshot.liquidity_usd < thresholds.min_liquidity_usd {
        score += weights.low_liquidity_penalty;
        factors.push(format!(
            "Thin pool: ${} of liquidity",
            snapshot.liquidity_usd.round_dp(0)
        ));
    } else if snapshot.liquidity_usd > thresholds.healthy_liquidity_usd {
        score -= weights.deep_liquidity_bonus;
        factors.push("Deep liquidity pool".into());
    }

    // Volume pattern.
    if metrics.volume_to_liquidity > thresholds.max_vol_liq_ratio {
        score += weights.hot_volume_penalty;
        factors.push(format!(
            "Overheated volume at {}x liquidity",
            metrics.volume_to_liquidity.round_dp(1)
        ));
    } else if metrics.volume_to_liquidity < weights.calm_vol_liq_ratio {
        score -= weights.calm_volume_bonus;
        factors.push("Calm trading relative to pool depth".into());
    }

    // Transaction pattern.
    let txns = snapshot.txns_24h();
    if txns < thresholds.min_txns_24h {
        score += weights.thin_txns_penalty;
        factors.push(format!(
            "Only {txns} transactions in 24h, minimum {}",
            thresholds.min_txns_24h
        ));
    } else if txns > thresholds.min_txns_24h * 3 {
        score -= weights.active_txns_bonus;
        factors.push(format!("Active market with {txns} transactions in 24h"));
    }

    RiskAssessment {
        score: score.clamp(0, 100) as u8,
        factors,
    }
}

/// Display bucket for a composite score.
pub fn risk_label(score: u8) -> &'static str {
    match score {
        0..=29 => "low",
        30..=59 => "medium",
        _ => "high",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
