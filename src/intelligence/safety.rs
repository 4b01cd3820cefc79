use rust_decimal::Decimal;

use crate::config::SafetyThresholds;
use crate::models::{DerivedMetrics, MarketSnapshot};

/// Run every safety check and collect the warnings that fire.
///
/// All checks run unconditionally, in a fixed order: liquidity, volume,
/// vol/liq ratio, transaction count, sell/buy skew, price spike. The
/// order is part of the output contract (warnings render in this order),
/// and the warning count feeds the classifier's Avoid gate.
pub fn evaluate_safety(
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
    thresholds: &SafetyThresholds,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if snapshot.liquidity_usd < thresholds.min_liquidity_usd {
        warnings.push(format!(
            "Insufficient liquidity: ${} below ${} minimum",
            snapshot.liquidity_usd.round_dp(0),
            thresholds.min_liquidity_usd,
        ));
    }

    if snapshot.volume_24h < thresholds.min_volume_24h {
        warnings.push(format!(
            "Low trading volume: ${} in 24h, minimum ${}",
            snapshot.volume_24h.round_dp(0),
            thresholds.min_volume_24h,
        ));
    }

    if metrics.volume_to_liquidity > thresholds.max_vol_liq_ratio {
        warnings.push(format!(
            "Volume at {}x liquidity suggests wash trading",
            metrics.volume_to_liquidity.round_dp(1),
        ));
    }

    if snapshot.txns_24h() < thresholds.min_txns_24h {
        warnings.push(format!(
            "Thin trading: {} transactions in 24h, minimum {}",
            snapshot.txns_24h(),
            thresholds.min_txns_24h,
        ));
    }

    if metrics.buy_ratio < thresholds.min_buy_ratio && snapshot.txns_24h() > 0 {
        warnings.push(format!(
            "Heavy sell pressure: only {}% of trades are buys",
            (metrics.buy_ratio * Decimal::ONE_HUNDRED).round_dp(0),
        ));
    }

    if snapshot.price_change_24h.abs() > thresholds.max_price_change_pct {
        warnings.push(format!(
            "Extreme price move: {}% in 24h",
            snapshot.price_change_24h.round_dp(1),
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
