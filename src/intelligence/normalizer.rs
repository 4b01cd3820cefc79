use rust_decimal::Decimal;

use crate::models::{DerivedMetrics, MarketSnapshot};

/// Derive per-cycle ratios from a raw snapshot.
///
/// Total over all well-formed inputs: zero denominators produce
/// zero-valued ratios rather than errors, and a missing 1h window leaves
/// the corresponding metric at zero.
pub fn derive_metrics(snapshot: &MarketSnapshot) -> DerivedMetrics {
    let total_txns = Decimal::from(snapshot.txns_24h());

    let buy_ratio = if total_txns.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::from(snapshot.buys_24h) / total_txns
    };

    let volume_to_liquidity = if snapshot.liquidity_usd.is_zero() {
        Decimal::ZERO
    } else {
        snapshot.volume_24h / snapshot.liquidity_usd
    };

    let avg_transaction_usd = if total_txns.is_zero() {
        Decimal::ZERO
    } else {
        snapshot.volume_24h / total_txns
    };

    DerivedMetrics {
        buy_ratio,
        volume_to_liquidity,
        hourly_acceleration: hourly_acceleration(snapshot),
        volume_acceleration: volume_acceleration(snapshot),
        avg_transaction_usd,
    }
}

/// Momentum proxy: the last hour's move against the 24h hourly average,
/// doubled and clamped to [-100, 100]. Heuristic scaling, kept exactly
/// for signal-threshold compatibility.
fn hourly_acceleration(snapshot: &MarketSnapshot) -> Decimal {
    let Some(change_1h) = snapshot.price_change_1h else {
        return Decimal::ZERO;
    };

    let hourly_avg = snapshot.price_change_24h / Decimal::from(24);
    let momentum = change_1h - hourly_avg;

    (momentum * Decimal::TWO)
        .clamp(Decimal::from(-100), Decimal::from(100))
        .round_dp(2)
}

/// Last hour's volume extrapolated to a full day, relative to the actual
/// 24h volume. Above 1 means volume is picking up pace.
fn volume_acceleration(snapshot: &MarketSnapshot) -> Decimal {
    let Some(volume_1h) = snapshot.volume_1h else {
        return Decimal::ZERO;
    };
    if snapshot.volume_24h.is_zero() {
        return Decimal::ZERO;
    }

    volume_1h * Decimal::from(24) / snapshot.volume_24h
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
