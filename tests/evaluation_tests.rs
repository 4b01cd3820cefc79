use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use tokenpulse::config::EngineConfig;
use tokenpulse::models::{MarketSnapshot, Signal, Trend};
use tokenpulse::Engine;

fn make_snapshot() -> MarketSnapshot {
    MarketSnapshot {
        address: "So1anaTokenAddr".into(),
        name: "Test Token".into(),
        symbol: "TT".into(),
        price: Decimal::ONE,
        volume_24h: Decimal::from(500_000),
        price_change_24h: Decimal::from(24),
        liquidity_usd: Decimal::from(100_000),
        price_change_1h: Some(Decimal::from(5)),
        volume_1h: Some(Decimal::from(30_000)),
        market_cap: Some(Decimal::from(5_000_000)),
        buys_24h: 700,
        sells_24h: 300,
        pair_created_at: None,
    }
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap()
}

#[test]
fn scenario_a_strong_buy_end_to_end() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let eval = engine.evaluate_at(&make_snapshot(), fixed_now());

    // liquidity 100k, volume 500k, 700/300 buys, +5% 1h against +24% 24h
    assert_eq!(eval.metrics.buy_ratio, Decimal::new(7, 1)); // 0.7
    assert_eq!(eval.metrics.volume_to_liquidity, Decimal::from(5));
    assert_eq!(eval.metrics.hourly_acceleration, Decimal::from(8));

    assert_eq!(eval.signal.signal, Signal::StrongBuy);
    assert_eq!(eval.signal.confidence, 90);
    assert_eq!(eval.signal.indicators.buy_pressure.trend, Trend::Up);
}

#[test]
fn avoid_outranks_strong_buy() {
    // Same pumping metrics, but a drained pool trips two safety
    // warnings (low liquidity, low volume). Rule 1 must win.
    let snapshot = MarketSnapshot {
        liquidity_usd: Decimal::from(4_000),
        volume_24h: Decimal::from(40_000),
        volume_1h: Some(Decimal::from(2_500)),
        ..make_snapshot()
    };

    let engine = Engine::new(EngineConfig::default()).unwrap();
    let eval = engine.evaluate_at(&snapshot, fixed_now());

    assert_eq!(eval.signal.signal, Signal::Avoid);
    assert_eq!(eval.signal.confidence, 90);
}

#[test]
fn division_guards_never_panic() {
    let snapshot = MarketSnapshot {
        liquidity_usd: Decimal::ZERO,
        buys_24h: 0,
        sells_24h: 0,
        volume_1h: None,
        price_change_1h: None,
        market_cap: None,
        ..make_snapshot()
    };

    let engine = Engine::new(EngineConfig::default()).unwrap();
    let eval = engine.evaluate_at(&snapshot, fixed_now());

    assert_eq!(eval.metrics.volume_to_liquidity, Decimal::ZERO);
    assert_eq!(eval.metrics.buy_ratio, Decimal::ZERO);
    assert_eq!(eval.metrics.avg_transaction_usd, Decimal::ZERO);
}

#[test]
fn hourly_acceleration_stays_clamped() {
    let extremes = [
        (Decimal::from(10_000), Decimal::from(-10_000)),
        (Decimal::from(-10_000), Decimal::from(10_000)),
        (Decimal::from(99), Decimal::ZERO),
    ];

    let engine = Engine::new(EngineConfig::default()).unwrap();
    for (change_1h, change_24h) in extremes {
        let snapshot = MarketSnapshot {
            price_change_1h: Some(change_1h),
            price_change_24h: change_24h,
            ..make_snapshot()
        };
        let eval = engine.evaluate_at(&snapshot, fixed_now());
        assert!(eval.metrics.hourly_acceleration >= Decimal::from(-100));
        assert!(eval.metrics.hourly_acceleration <= Decimal::from(100));
    }
}

#[test]
fn risk_score_clamped_under_every_penalty() {
    // Micro cap, dry pool, wash-trade volume, near-zero transactions.
    let snapshot = MarketSnapshot {
        liquidity_usd: Decimal::from(500),
        volume_24h: Decimal::from(100_000),
        market_cap: Some(Decimal::from(20_000)),
        buys_24h: 3,
        sells_24h: 2,
        ..make_snapshot()
    };

    let engine = Engine::new(EngineConfig::default()).unwrap();
    let eval = engine.evaluate_at(&snapshot, fixed_now());
    assert_eq!(eval.signal.risk_score, 100);
}

#[test]
fn reasons_render_in_section_order() {
    let engine = Engine::new(EngineConfig::default()).unwrap();

    let snapshot = MarketSnapshot {
        liquidity_usd: Decimal::from(4_000),
        volume_24h: Decimal::from(40_000),
        ..make_snapshot()
    };
    let eval = engine.evaluate_at(&snapshot, fixed_now());
    let reasons = &eval.signal.reasons;

    // Session insight always leads.
    assert!(reasons[0].contains("trading window") || reasons[0].contains("hours"));

    // Safety warnings come before the risk factors.
    let safety_idx = reasons
        .iter()
        .position(|r| r.contains("Insufficient liquidity"))
        .expect("safety warning present");
    let risk_idx = reasons
        .iter()
        .position(|r| r.contains("Thin pool"))
        .expect("risk factor present");
    assert!(safety_idx < risk_idx);
}

#[test]
fn moderate_buy_band_end_to_end() {
    // 0.58 buys, 1.8x vol/liq, mild acceleration: moderate band only.
    let snapshot = MarketSnapshot {
        volume_24h: Decimal::from(540_000),
        liquidity_usd: Decimal::from(300_000),
        buys_24h: 580,
        sells_24h: 420,
        price_change_1h: Some(Decimal::from(2)),
        price_change_24h: Decimal::from(24),
        ..make_snapshot()
    };

    let engine = Engine::new(EngineConfig::default()).unwrap();
    let eval = engine.evaluate_at(&snapshot, fixed_now());
    assert_eq!(eval.signal.signal, Signal::ModerateBuy);
    assert_eq!(eval.signal.confidence, 70);
}

#[test]
fn avoid_gate_is_configurable() {
    // Raising the Avoid gate to 3 lets a 2-warning token through.
    let mut config = EngineConfig::default();
    config.safety.avoid_warning_count = 3;

    let snapshot = MarketSnapshot {
        liquidity_usd: Decimal::from(4_000),
        volume_24h: Decimal::from(40_000),
        volume_1h: Some(Decimal::from(2_500)),
        ..make_snapshot()
    };

    let engine = Engine::new(config).unwrap();
    let eval = engine.evaluate_at(&snapshot, fixed_now());
    assert_ne!(eval.signal.signal, Signal::Avoid);
}
