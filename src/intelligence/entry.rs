use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EntryRules;
use crate::models::{DerivedMetrics, MarketSnapshot};

/// Entry recommendation for a token at the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryAction {
    /// All preconditions met with strong conviction.
    Enter,
    /// Preconditions met; build the position in tranches.
    ScaleIn,
    /// One precondition missed; worth tracking, not buying.
    Monitor,
    Wait,
}

impl EntryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryAction::Enter => "ENTER",
            EntryAction::ScaleIn => "SCALE_IN",
            EntryAction::Monitor => "MONITOR",
            EntryAction::Wait => "WAIT",
        }
    }
}

impl fmt::Display for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slice of a scaled entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tranche {
    pub fraction: Decimal,
    pub amount_usd: Decimal,
    pub trigger: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPlan {
    pub action: EntryAction,
    /// Upside price target. Only set when a plan was accepted.
    pub resistance: Option<Decimal>,
    /// Downside stop reference.
    pub support: Option<Decimal>,
    pub risk_reward: Option<Decimal>,
    pub max_size_usd: Option<Decimal>,
    pub tranches: Vec<Tranche>,
    pub reasons: Vec<String>,
}

impl EntryPlan {
    fn wait(reasons: Vec<String>) -> Self {
        Self {
            action: EntryAction::Wait,
            resistance: None,
            support: None,
            risk_reward: None,
            max_size_usd: None,
            tranches: Vec::new(),
            reasons,
        }
    }
}

/// Decide whether and how to enter.
///
/// Three preconditions gate any plan: enough liquidity, enough buy
/// pressure, and 24h volatility inside the tradeable range. A single
/// miss downgrades to Monitor, more than one to Wait. Accepted plans are
/// priced off fixed resistance/support multipliers and rejected outright
/// when the resulting risk/reward is below the configured floor.
pub fn plan_entry(
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
    rules: &EntryRules,
) -> EntryPlan {
    let mut failures = Vec::new();

    if snapshot.liquidity_usd < rules.min_liquidity_usd {
        failures.push(format!(
            "Liquidity ${} below the ${} entry floor",
            snapshot.liquidity_usd.round_dp(0),
            rules.min_liquidity_usd
        ));
    }
    if metrics.buy_ratio < rules.min_buy_ratio {
        failures.push(format!(
            "Buy ratio {}% below the {}% entry floor",
            (metrics.buy_ratio * Decimal::ONE_HUNDRED).round_dp(0),
            (rules.min_buy_ratio * Decimal::ONE_HUNDRED).round_dp(0)
        ));
    }
    if snapshot.price_change_24h.abs() > rules.max_volatility_pct {
        failures.push(format!(
            "24h move of {}% outside the {}% volatility cap",
            snapshot.price_change_24h.round_dp(1),
            rules.max_volatility_pct
        ));
    }

    match failures.len() {
        0 => {}
        1 => {
            let mut reasons = failures;
            reasons.push("Close to an entry setup, keep on watch".into());
            return EntryPlan {
                action: EntryAction::Monitor,
                resistance: None,
                support: None,
                risk_reward: None,
                max_size_usd: None,
                tranches: Vec::new(),
                reasons,
            };
        }
        _ => return EntryPlan::wait(failures),
    }

    // Price targets and the risk/reward gate.
    let price = snapshot.price;
    if price.is_zero() {
        return EntryPlan::wait(vec!["No quotable price".into()]);
    }

    let resistance = price * rules.resistance_multiplier;
    let support = price * rules.support_multiplier;
    let risk = price - support;
    if risk <= Decimal::ZERO {
        return EntryPlan::wait(vec!["Support level above entry, no defined risk".into()]);
    }
    let risk_reward = (resistance - price) / risk;

    if risk_reward < rules.min_risk_reward {
        return EntryPlan::wait(vec![format!(
            "Risk/reward {} below the {} minimum",
            risk_reward.round_dp(2),
            rules.min_risk_reward
        )]);
    }

    // Position cap: a fraction of pool depth, bounded by the absolute cap.
    let max_size_usd = (snapshot.liquidity_usd * rules.max_liquidity_fraction)
        .min(rules.max_position_usd);

    let tranches = vec![
        Tranche {
            fraction: rules.initial_tranche,
            amount_usd: (max_size_usd * rules.initial_tranche).round_dp(2),
            trigger: "Enter immediately at market".into(),
        },
        Tranche {
            fraction: rules.secondary_tranche,
            amount_usd: (max_size_usd * rules.secondary_tranche).round_dp(2),
            trigger: format!(
                "Add on a {}% pullback toward ${}",
                rules.pullback_pct,
                support.round_dp(6)
            ),
        },
        Tranche {
            fraction: rules.final_tranche,
            amount_usd: (max_size_usd * rules.final_tranche).round_dp(2),
            trigger: "Add once momentum confirms with price holding above entry".into(),
        },
    ];

    let action = if metrics.buy_ratio >= rules.strong_buy_ratio {
        EntryAction::Enter
    } else {
        EntryAction::ScaleIn
    };

    let reasons = vec![
        format!(
            "Upside target ${} against ${} support, {}:1 reward to risk",
            resistance.round_dp(6),
            support.round_dp(6),
            risk_reward.round_dp(2)
        ),
        format!(
            "Position capped at ${max_size_usd} by pool depth, split {}/{}/{}",
            (rules.initial_tranche * Decimal::ONE_HUNDRED).normalize(),
            (rules.secondary_tranche * Decimal::ONE_HUNDRED).normalize(),
            (rules.final_tranche * Decimal::ONE_HUNDRED).normalize()
        ),
    ];

    EntryPlan {
        action,
        resistance: Some(resistance),
        support: Some(support),
        risk_reward: Some(risk_reward),
        max_size_usd: Some(max_size_usd),
        tranches,
        reasons,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
