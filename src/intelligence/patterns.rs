use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;

use crate::config::{SafetyThresholds, TradingSessions};
use crate::models::{DerivedMetrics, MarketSnapshot};

// Chart-pattern bands. These are display heuristics, not config: tuning
// them does not change any trading decision, only the insight text.
const BREAKOUT_MIN_GAIN: i64 = 10;
const BREAKOUT_MIN_VOL_LIQ: i64 = 2;
const ACCUMULATION_MAX_RANGE: i64 = 5;
const MOMENTUM_MIN_ACCEL: i64 = 15;
const BREAKDOWN_SUPPORT_BREAK: i64 = -10;
const EXHAUSTION_MIN_GAIN: i64 = 50;

/// Session quality from the configured UTC windows.
pub fn session_insight(sessions: &TradingSessions, now: DateTime<Utc>) -> String {
    let hour = now.hour();
    if sessions.is_peak(hour) {
        format!("Peak trading window ({hour:02}:00 UTC), signals carry more weight")
    } else if sessions.is_quiet(hour) {
        format!("Quiet hours ({hour:02}:00 UTC), moves on thin volume are unreliable")
    } else {
        format!("Normal trading hours ({hour:02}:00 UTC)")
    }
}

/// Match the snapshot against the bullish and bearish chart-pattern
/// templates. Several patterns can hold at once; all matches are listed.
pub fn chart_patterns(snapshot: &MarketSnapshot, metrics: &DerivedMetrics) -> Vec<String> {
    let mut insights = Vec::new();
    let change = snapshot.price_change_24h;

    let breakout_buy_ratio = Decimal::new(65, 2); // 0.65
    if change >= Decimal::from(BREAKOUT_MIN_GAIN)
        && metrics.volume_to_liquidity >= Decimal::from(BREAKOUT_MIN_VOL_LIQ)
        && metrics.buy_ratio >= breakout_buy_ratio
    {
        insights.push(format!(
            "Bullish breakout: +{}% on {}x volume",
            change.round_dp(1),
            metrics.volume_to_liquidity.round_dp(1)
        ));
    }

    let accumulation_buy_ratio = Decimal::new(7, 1); // 0.7
    if change.abs() <= Decimal::from(ACCUMULATION_MAX_RANGE)
        && metrics.buy_ratio >= accumulation_buy_ratio
    {
        insights.push("Quiet accumulation: flat price with buyers dominating".into());
    }

    let momentum_volume_pace = Decimal::new(15, 1); // 1.5
    if metrics.hourly_acceleration >= Decimal::from(MOMENTUM_MIN_ACCEL)
        && metrics.volume_acceleration >= momentum_volume_pace
    {
        insights.push("Momentum build: price and volume both accelerating".into());
    }

    let distribution_buy_ratio = Decimal::new(4, 1); // 0.4
    let distribution_impact = Decimal::new(5, 2);    // 0.05 of liquidity
    if metrics.buy_ratio <= distribution_buy_ratio
        && !snapshot.liquidity_usd.is_zero()
        && metrics.avg_transaction_usd >= snapshot.liquidity_usd * distribution_impact
    {
        insights.push("Distribution: large sells dominating the tape".into());
    }

    let breakdown_buy_ratio = Decimal::new(3, 1); // 0.3
    if change <= Decimal::from(BREAKDOWN_SUPPORT_BREAK)
        && metrics.volume_to_liquidity >= Decimal::from(BREAKOUT_MIN_VOL_LIQ)
        && metrics.buy_ratio <= breakdown_buy_ratio
    {
        insights.push(format!(
            "Breakdown: {}% on heavy volume with buyers absent",
            change.round_dp(1)
        ));
    }

    let exhaustion_volume_pace = Decimal::new(5, 1); // 0.5
    if change >= Decimal::from(EXHAUSTION_MIN_GAIN)
        && snapshot.volume_1h.is_some()
        && metrics.volume_acceleration <= exhaustion_volume_pace
    {
        insights.push("Rally exhaustion: large gain no longer supported by volume".into());
    }

    insights
}

// Maturity bands.
const NEW_TOKEN_MAX_AGE_HOURS: i64 = 48;
const NEW_TOKEN_MAX_CAP: i64 = 10_000_000;
const ESTABLISHED_MIN_AGE_HOURS: i64 = 168;
const ESTABLISHED_MIN_CAP: i64 = 50_000_000;

/// Rough lifecycle classification from pair age and market cap.
pub fn maturity_insight(snapshot: &MarketSnapshot, now: DateTime<Utc>) -> Option<String> {
    let age_hours = snapshot.age_hours(now);
    let cap = snapshot.market_cap;

    let is_new = age_hours.map(|h| h < NEW_TOKEN_MAX_AGE_HOURS).unwrap_or(false)
        || cap.map(|c| c < Decimal::from(NEW_TOKEN_MAX_CAP)).unwrap_or(false);
    let is_established = age_hours.map(|h| h >= ESTABLISHED_MIN_AGE_HOURS).unwrap_or(false)
        && cap.map(|c| c >= Decimal::from(ESTABLISHED_MIN_CAP)).unwrap_or(false);

    if is_established {
        Some("Established token: week-plus track record and mature cap".into())
    } else if is_new {
        Some("Early-stage token: history too short to trust the tape".into())
    } else {
        None
    }
}

/// Order-flow insight from the buy/sell transaction balance, plus the
/// intraday volume pace when it stands out.
pub fn volume_insight(snapshot: &MarketSnapshot, metrics: &DerivedMetrics) -> Option<String> {
    if snapshot.sells_24h > 0 {
        let flow = Decimal::from(snapshot.buys_24h) / Decimal::from(snapshot.sells_24h);
        let very_bullish = Decimal::from(3);
        let bullish = Decimal::new(15, 1);      // 1.5
        let bearish = Decimal::new(67, 2);      // 0.67
        let very_bearish = Decimal::new(33, 2); // 0.33

        if flow >= very_bullish {
            return Some(format!("Buyers outnumber sellers {}:1", flow.round_dp(1)));
        }
        if flow >= bullish {
            return Some("Order flow tilted to the buy side".into());
        }
        if flow <= very_bearish {
            return Some(format!(
                "Sellers overwhelm buyers {}:1",
                (Decimal::ONE / flow).round_dp(1)
            ));
        }
        if flow <= bearish {
            return Some("Order flow tilted to the sell side".into());
        }
    }

    let major_pace = Decimal::from(5);
    let significant_pace = Decimal::TWO;
    if metrics.volume_acceleration >= major_pace {
        return Some(format!(
            "Major volume surge: {}x the 24h pace",
            metrics.volume_acceleration.round_dp(1)
        ));
    }
    if metrics.volume_acceleration >= significant_pace {
        return Some("Volume running at twice the 24h pace".into());
    }

    None
}

// Emergency-exit bands for tokens already held.
const EXIT_MAX_HOURLY_DROP: i64 = -5;

/// Conditions that argue for exiting an existing holding, independent of
/// the entry-side signal.
pub fn exit_signals(snapshot: &MarketSnapshot, metrics: &DerivedMetrics) -> Vec<String> {
    let mut signals = Vec::new();

    if let Some(change_1h) = snapshot.price_change_1h {
        if change_1h <= Decimal::from(EXIT_MAX_HOURLY_DROP) {
            signals.push(format!(
                "Sharp drop: {}% in the last hour",
                change_1h.round_dp(1)
            ));
        }
    }

    let exit_buy_floor = Decimal::new(4, 1); // 0.40
    if snapshot.txns_24h() > 0 && metrics.buy_ratio < exit_buy_floor {
        signals.push("Buy support fading, tighten exits".into());
    }

    signals
}

/// Cap-band warning: too small to be viable, or past the easy upside.
pub fn market_cap_warning(
    snapshot: &MarketSnapshot,
    thresholds: &SafetyThresholds,
) -> Option<String> {
    let cap = snapshot.market_cap?;
    if cap < thresholds.min_viable_market_cap {
        Some(format!(
            "Market cap ${cap} below the ${} viability floor",
            thresholds.min_viable_market_cap
        ))
    } else if cap > thresholds.sweet_spot_market_cap {
        Some(format!(
            "Market cap past ${}, upside likely limited",
            thresholds.sweet_spot_market_cap
        ))
    } else {
        None
    }
}

/// Whale-pressure heuristic: average trade size large relative to the
/// pool, or volume far outrunning liquidity.
pub fn whale_warning(
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
    thresholds: &SafetyThresholds,
) -> Option<String> {
    if !snapshot.liquidity_usd.is_zero()
        && metrics.avg_transaction_usd
            >= snapshot.liquidity_usd * thresholds.max_wallet_concentration
    {
        return Some(format!(
            "Concentration risk: average clip ${} is {}%+ of the pool",
            metrics.avg_transaction_usd.round_dp(0),
            (thresholds.max_wallet_concentration * Decimal::ONE_HUNDRED).normalize()
        ));
    }

    if !snapshot.liquidity_usd.is_zero()
        && metrics.avg_transaction_usd >= snapshot.liquidity_usd * thresholds.whale_tx_impact
    {
        return Some(format!(
            "Whale-sized trades: average ${} against ${} liquidity",
            metrics.avg_transaction_usd.round_dp(0),
            snapshot.liquidity_usd.round_dp(0)
        ));
    }

    if metrics.volume_to_liquidity > thresholds.whale_vol_liq_mult {
        return Some(format!(
            "Volume at {}x liquidity, a few wallets can move this price",
            metrics.volume_to_liquidity.round_dp(1)
        ));
    }

    None
}

// Price-action bands.
const PARABOLIC_GAIN: i64 = 100;
const HEALTHY_GROWTH_MIN: i64 = 20;
const REVERSAL_ACCEL: i64 = -10;
const STRONG_ACCEL: i64 = 15;
const CONSOLIDATION_RANGE: i64 = 5;

/// One-line read of the 24h price action. First matching band wins.
pub fn price_action_insight(
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
) -> Option<String> {
    let change = snapshot.price_change_24h;

    if change > Decimal::from(PARABOLIC_GAIN) {
        return Some(format!(
            "Parabolic move: +{}% in 24h, extended and prone to snapback",
            change.round_dp(0)
        ));
    }
    if metrics.hourly_acceleration <= Decimal::from(REVERSAL_ACCEL) {
        return Some("Momentum reversal forming against the 24h trend".into());
    }
    if metrics.hourly_acceleration >= Decimal::from(STRONG_ACCEL) {
        return Some("Strong momentum versus the 24h pace".into());
    }
    if change >= Decimal::from(HEALTHY_GROWTH_MIN) && change <= Decimal::from(PARABOLIC_GAIN) {
        return Some(format!("Healthy uptrend: +{}% in 24h", change.round_dp(1)));
    }

    let consolidation_vol_floor = Decimal::new(5, 1); // 0.5
    if change.abs() < Decimal::from(CONSOLIDATION_RANGE)
        && metrics.volume_to_liquidity >= consolidation_vol_floor
    {
        return Some("Consolidating in a tight range on steady volume".into());
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
