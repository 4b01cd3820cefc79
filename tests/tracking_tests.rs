use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use tokenpulse::config::EngineConfig;
use tokenpulse::models::{AlertDirection, MarketSnapshot, Notification, NotificationKind};
use tokenpulse::Engine;

fn make_token(address: &str, price: &str) -> MarketSnapshot {
    MarketSnapshot {
        address: address.into(),
        name: "Test Token".into(),
        symbol: "TT".into(),
        price: price.parse().unwrap(),
        volume_24h: Decimal::from(600_000),
        price_change_24h: Decimal::from(12),
        liquidity_usd: Decimal::from(600_000),
        price_change_1h: Some(Decimal::ONE),
        volume_1h: None,
        market_cap: Some(Decimal::from(8_000_000)),
        buys_24h: 600,
        sells_24h: 400,
        pair_created_at: None,
    }
}

fn engine_with_log() -> (Engine, Arc<Mutex<Vec<Notification>>>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let engine = Engine::new(EngineConfig::default()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    engine.bus.subscribe(move |n| sink.lock().push(n.clone()));
    (engine, log)
}

#[test]
fn scenario_b_trailing_stop_tracks_high_water_mark() {
    let (engine, _log) = engine_with_log();
    engine
        .positions
        .open(&make_token("PosToken", "1.0"), Decimal::from(100))
        .unwrap();

    engine.positions.tick("PosToken", Decimal::new(15, 1)).unwrap(); // 1.5
    engine.positions.tick("PosToken", Decimal::new(12, 1)).unwrap(); // 1.2

    let position = engine.positions.get("PosToken").unwrap();
    assert_eq!(position.highest_price, Decimal::new(15, 1));
    // 1.5 * (1 - 0.05), not recomputed from the 1.2 dip
    assert_eq!(position.trailing_stop, Decimal::new(1425, 3));
    assert_eq!(position.current_price, Decimal::new(12, 1));
}

#[test]
fn scenario_c_watchlist_alert_fires_exactly_once() {
    let (engine, log) = engine_with_log();
    engine.watchlist.add(&make_token("WatchToken", "1.0"), "");
    engine
        .watchlist
        .add_alert("WatchToken", Decimal::TWO, AlertDirection::Above);

    engine.watchlist.tick("WatchToken", Decimal::new(25, 1)).unwrap();
    let fired = |log: &Arc<Mutex<Vec<Notification>>>| {
        log.lock()
            .iter()
            .filter(|n| n.message.contains("above 2 "))
            .count()
    };
    assert_eq!(fired(&log), 1);

    // Oscillating across the threshold never re-fires the latched alert.
    engine.watchlist.tick("WatchToken", Decimal::ONE).unwrap();
    engine.watchlist.tick("WatchToken", Decimal::from(3)).unwrap();
    assert_eq!(fired(&log), 1);
}

#[test]
fn take_profit_target_fires_once_across_hundred_ticks() {
    let (engine, log) = engine_with_log();
    engine
        .positions
        .open(&make_token("PosToken", "1.0"), Decimal::from(100))
        .unwrap();

    for _ in 0..100 {
        engine.positions.tick("PosToken", Decimal::new(125, 2)).unwrap(); // above target 1
    }

    let target_alerts = log
        .lock()
        .iter()
        .filter(|n| n.message.contains("target 1"))
        .count();
    assert_eq!(target_alerts, 1);

    // The position is still open: intermediate targets never auto-close.
    assert!(engine.positions.get("PosToken").is_some());
}

#[test]
fn stop_loss_closes_and_reports_final_pnl() {
    let (engine, log) = engine_with_log();
    engine
        .positions
        .open(&make_token("PosToken", "1.0"), Decimal::from(100))
        .unwrap();

    engine.positions.tick("PosToken", Decimal::new(9, 1)).unwrap(); // 0.9 <= 0.93 stop

    assert!(engine.positions.get("PosToken").is_none());
    let messages = log.lock();
    assert!(messages.iter().any(|n| n.message.contains("Stop loss hit")));
    assert!(messages
        .iter()
        .any(|n| n.kind == NotificationKind::Exit && n.message.contains("-10")));
}

#[test]
fn registries_share_one_bus_per_engine() {
    let (engine_a, log_a) = engine_with_log();
    let (engine_b, log_b) = engine_with_log();

    engine_a
        .positions
        .open(&make_token("PosToken", "1.0"), Decimal::from(50))
        .unwrap();

    // Engine B's subscribers see nothing from engine A.
    assert_eq!(log_a.lock().len(), 1); // ENTRY
    assert!(log_b.lock().is_empty());
    drop(engine_b);
}

#[test]
fn concurrent_ticks_keep_invariants() {
    let (engine, log) = engine_with_log();
    let engine = Arc::new(engine);
    engine
        .positions
        .open(&make_token("PosToken", "1.0"), Decimal::from(100))
        .unwrap();

    // Hammer the same position from several feeds with prices above the
    // first target and below the high, concurrently.
    std::thread::scope(|scope| {
        for worker in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for i in 0..250 {
                    let cents = 121 + ((worker * 7 + i) % 10); // 1.21..1.30
                    engine
                        .positions
                        .tick("PosToken", Decimal::new(cents, 2))
                        .unwrap();
                }
            });
        }
    });

    let position = engine.positions.get("PosToken").unwrap();
    // Highest price is the max any worker ever sent.
    assert_eq!(position.highest_price, Decimal::new(130, 2));
    // Trailing stop reflects that high and nothing lower.
    assert_eq!(position.trailing_stop, Decimal::new(130, 2) * Decimal::new(95, 2));

    // The first target fired exactly once despite 1000 competing ticks.
    let target_alerts = log
        .lock()
        .iter()
        .filter(|n| n.message.contains("target 1"))
        .count();
    assert_eq!(target_alerts, 1);
}

#[test]
fn watchlist_duplicate_alerts_are_kept() {
    let (engine, log) = engine_with_log();
    engine.watchlist.add(&make_token("WatchToken", "1.0"), "watch this");
    engine
        .watchlist
        .add_alert("WatchToken", Decimal::TWO, AlertDirection::Above);
    engine
        .watchlist
        .add_alert("WatchToken", Decimal::TWO, AlertDirection::Above);

    let item = engine.watchlist.get("WatchToken").unwrap();
    assert_eq!(item.alerts.len(), 4); // two defaults + two duplicates

    engine.watchlist.tick("WatchToken", Decimal::from(3)).unwrap();
    let fired = log
        .lock()
        .iter()
        .filter(|n| n.message.contains("above 2 "))
        .count();
    assert_eq!(fired, 2);
}
