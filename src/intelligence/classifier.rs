use rust_decimal::Decimal;

use crate::config::{SignalThresholds, SmartMoneyRules};
use crate::models::{DerivedMetrics, Indicator, IndicatorSet, Signal, Trend};

/// Classifier output before the full reason list is assembled.
#[derive(Debug, Clone)]
pub struct Classification {
    pub signal: Signal,
    pub confidence: u8,
    /// Rule-level reasoning, rendered in the "strategy" section.
    pub reasons: Vec<String>,
}

const AVOID_CONFIDENCE: u8 = 90;
const STRONG_BUY_CONFIDENCE: u8 = 90;
const MODERATE_BUY_CONFIDENCE: u8 = 70;
const STRONG_SELL_CONFIDENCE: u8 = 85;
const CONSIDER_SELL_CONFIDENCE: u8 = 65;
const HOLD_CONFIDENCE: u8 = 50;

/// Priority-ordered decision table over the derived metrics. The first
/// matching rule wins; later rules are never evaluated once one matches,
/// which fixes precedence when several conditions hold at once (a token
/// that is both unsafe and pumping is Avoid, not StrongBuy).
///
/// Buy rules require all three metrics to clear their band; sell rules
/// trigger on any single metric breaking down.
pub fn classify(
    metrics: &DerivedMetrics,
    safety_warning_count: usize,
    avoid_warning_count: usize,
    thresholds: &SignalThresholds,
) -> Classification {
    // Rule 1: safety gate.
    if safety_warning_count >= avoid_warning_count {
        return Classification {
            signal: Signal::Avoid,
            confidence: AVOID_CONFIDENCE,
            reasons: vec![format!(
                "{safety_warning_count} independent safety warnings active"
            )],
        };
    }

    let buy_ratio_pct = (metrics.buy_ratio * Decimal::ONE_HUNDRED).round_dp(0);

    // Rule 2: strong buy, all three metrics aligned.
    let strong = &thresholds.strong_buy;
    if metrics.buy_ratio >= strong.buy_ratio
        && metrics.volume_to_liquidity >= strong.vol_liq_ratio
        && metrics.hourly_acceleration >= strong.acceleration
    {
        return Classification {
            signal: Signal::StrongBuy,
            confidence: STRONG_BUY_CONFIDENCE,
            reasons: vec![
                format!("Strong buy pressure: {buy_ratio_pct}% of trades are buys"),
                format!(
                    "Volume running {}x liquidity",
                    metrics.volume_to_liquidity.round_dp(1)
                ),
                format!(
                    "Price accelerating at {} vs 24h pace",
                    metrics.hourly_acceleration
                ),
            ],
        };
    }

    // Rule 3: moderate buy.
    let moderate = &thresholds.moderate_buy;
    if metrics.buy_ratio >= moderate.buy_ratio
        && metrics.volume_to_liquidity >= moderate.vol_liq_ratio
        && metrics.hourly_acceleration >= moderate.acceleration
    {
        return Classification {
            signal: Signal::ModerateBuy,
            confidence: MODERATE_BUY_CONFIDENCE,
            reasons: vec![format!(
                "Buyers in control ({buy_ratio_pct}%) with volume and momentum building"
            )],
        };
    }

    // Rule 4: strong sell, any single breakdown.
    let strong_sell = &thresholds.strong_sell;
    if metrics.buy_ratio <= strong_sell.buy_ratio
        || metrics.volume_to_liquidity <= strong_sell.vol_liq_ratio
        || metrics.hourly_acceleration <= strong_sell.acceleration
    {
        let mut reasons = Vec::new();
        if metrics.buy_ratio <= strong_sell.buy_ratio {
            reasons.push(format!(
                "Buy support collapsed to {buy_ratio_pct}% of trades"
            ));
        }
        if metrics.volume_to_liquidity <= strong_sell.vol_liq_ratio {
            reasons.push(format!(
                "Trading interest drying up ({}x liquidity)",
                metrics.volume_to_liquidity.round_dp(2)
            ));
        }
        if metrics.hourly_acceleration <= strong_sell.acceleration {
            reasons.push(format!(
                "Momentum stalled at {}",
                metrics.hourly_acceleration
            ));
        }
        return Classification {
            signal: Signal::StrongSell,
            confidence: STRONG_SELL_CONFIDENCE,
            reasons,
        };
    }

    // Rule 5: moderate sell.
    let moderate_sell = &thresholds.moderate_sell;
    if metrics.buy_ratio <= moderate_sell.buy_ratio
        || metrics.volume_to_liquidity <= moderate_sell.vol_liq_ratio
        || metrics.hourly_acceleration <= moderate_sell.acceleration
    {
        return Classification {
            signal: Signal::ConsiderSell,
            confidence: CONSIDER_SELL_CONFIDENCE,
            reasons: vec!["Buy pressure, volume or momentum weakening".into()],
        };
    }

    // Rule 6: nothing decisive.
    Classification {
        signal: Signal::Hold,
        confidence: HOLD_CONFIDENCE,
        reasons: vec!["No decisive pressure in either direction".into()],
    }
}

/// Detect informed accumulation: unusually large average trades paired
/// with a high buy ratio. When present, raises confidence to the
/// configured value; confidence is never lowered by this path.
pub fn smart_money_active(metrics: &DerivedMetrics, rules: &SmartMoneyRules) -> bool {
    metrics.avg_transaction_usd >= rules.min_avg_transaction_usd
        && metrics.buy_ratio >= rules.min_buy_ratio
}

pub fn apply_smart_money_boost(classification: &mut Classification, rules: &SmartMoneyRules) {
    classification.confidence = classification.confidence.max(rules.boosted_confidence);
}

/// Band each indicator independently of the overall signal, using the
/// moderate thresholds as the neutral zone's edges.
pub fn indicator_set(metrics: &DerivedMetrics, thresholds: &SignalThresholds) -> IndicatorSet {
    IndicatorSet {
        buy_pressure: Indicator {
            value: metrics.buy_ratio,
            trend: band(
                metrics.buy_ratio,
                thresholds.moderate_buy.buy_ratio,
                thresholds.moderate_sell.buy_ratio,
            ),
        },
        volume: Indicator {
            value: metrics.volume_to_liquidity,
            trend: band(
                metrics.volume_to_liquidity,
                thresholds.moderate_buy.vol_liq_ratio,
                thresholds.moderate_sell.vol_liq_ratio,
            ),
        },
        price_movement: Indicator {
            value: metrics.hourly_acceleration,
            trend: band(
                metrics.hourly_acceleration,
                thresholds.moderate_buy.acceleration,
                thresholds.moderate_sell.acceleration,
            ),
        },
    }
}

fn band(value: Decimal, up_at: Decimal, down_at: Decimal) -> Trend {
    if value >= up_at {
        Trend::Up
    } else if value <= down_at {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
