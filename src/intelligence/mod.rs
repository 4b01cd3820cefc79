pub mod classifier;
pub mod entry;
pub mod normalizer;
pub mod patterns;
pub mod risk;
pub mod safety;

pub use classifier::{classify, indicator_set, Classification};
pub use entry::{plan_entry, EntryAction, EntryPlan, Tranche};
pub use normalizer::derive_metrics;
pub use risk::{risk_label, score_risk, RiskAssessment};
pub use safety::evaluate_safety;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{DerivedMetrics, MarketSnapshot, TradingSignal};

/// Full evaluation output for one token and one poll cycle: the
/// composite signal, the derived metrics behind it (for display), and
/// the entry plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEvaluation {
    pub address: String,
    pub symbol: String,
    pub signal: TradingSignal,
    pub metrics: DerivedMetrics,
    pub entry: EntryPlan,
}

/// Evaluate one snapshot end to end.
///
/// Pure with respect to its inputs; `now` feeds the session and
/// maturity insights so tests can pin the clock. The reasons list is
/// assembled in a fixed section order (session, chart patterns, smart
/// money, maturity, volume, safety, exit signals, market cap, whale,
/// price action, risk factors, strategy, entry plan). The order carries
/// no semantic weight, but downstream fixtures depend on it being
/// stable.
pub fn evaluate(
    config: &EngineConfig,
    snapshot: &MarketSnapshot,
    now: DateTime<Utc>,
) -> TokenEvaluation {
    let metrics = derive_metrics(snapshot);

    let warnings = evaluate_safety(snapshot, &metrics, &config.safety);
    let smart_money = classifier::smart_money_active(&metrics, &config.smart_money);

    let mut classification = classify(
        &metrics,
        warnings.len(),
        config.safety.avoid_warning_count,
        &config.signals,
    );
    if smart_money {
        classifier::apply_smart_money_boost(&mut classification, &config.smart_money);
    }

    let assessment = score_risk(snapshot, &metrics, &config.safety, &config.risk);
    let plan = plan_entry(snapshot, &metrics, &config.entry);

    let mut reasons = Vec::new();
    reasons.push(patterns::session_insight(&config.sessions, now));
    reasons.extend(patterns::chart_patterns(snapshot, &metrics));
    if smart_money {
        reasons.push(format!(
            "Smart money accumulating: average trade ${} with {}% buys",
            metrics.avg_transaction_usd.round_dp(0),
            (metrics.buy_ratio * rust_decimal::Decimal::ONE_HUNDRED).round_dp(0)
        ));
    }
    reasons.extend(patterns::maturity_insight(snapshot, now));
    reasons.extend(patterns::volume_insight(snapshot, &metrics));
    reasons.extend(warnings.iter().cloned());
    reasons.extend(patterns::exit_signals(snapshot, &metrics));
    reasons.extend(patterns::market_cap_warning(snapshot, &config.safety));
    reasons.extend(patterns::whale_warning(snapshot, &metrics, &config.safety));
    reasons.extend(patterns::price_action_insight(snapshot, &metrics));
    reasons.extend(assessment.factors.iter().cloned());
    reasons.extend(classification.reasons.iter().cloned());
    reasons.extend(plan.reasons.iter().cloned());

    counter!("evaluations_total").increment(1);

    TokenEvaluation {
        address: snapshot.address.clone(),
        symbol: snapshot.symbol.clone(),
        signal: TradingSignal {
            signal: classification.signal,
            confidence: classification.confidence,
            reasons,
            risk_score: assessment.score,
            indicators: indicator_set(&metrics, &config.signals),
        },
        metrics,
        entry: plan,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
