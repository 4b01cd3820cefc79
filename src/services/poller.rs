use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

use crate::data::MarketDataSource;
use crate::intelligence::TokenEvaluation;
use crate::Engine;

/// Clock seam for the poll loops. Production uses [`IntervalTicker`];
/// tests drive ticks by hand so schedules run without wall-clock time.
#[async_trait]
pub trait Ticker: Send + 'static {
    /// Complete when the next tick is due.
    async fn tick(&mut self);
}

pub struct IntervalTicker(Interval);

impl IntervalTicker {
    pub fn every(period: Duration) -> Self {
        let mut inner = interval(period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self(inner)
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.0.tick().await;
    }
}

/// Handle for a running poll loop. `stop` halts future ticks; a fetch
/// already in flight is discarded rather than applied.
pub struct PollerHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the trending-token loop: on every tick, fetch the snapshot
/// batch, evaluate each token, and hand the batch to the consumer. An
/// empty batch is valid and forwarded as such; fetch errors are logged
/// and the loop keeps going.
pub fn spawn_market_poller<S, T>(
    engine: Arc<Engine>,
    source: Arc<S>,
    mut ticker: T,
    evaluations_tx: mpsc::Sender<Vec<TokenEvaluation>>,
) -> PollerHandle
where
    S: MarketDataSource + 'static,
    T: Ticker,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let task = tokio::spawn(async move {
        loop {
            ticker.tick().await;
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }

            let snapshots = match source.fetch_snapshots().await {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    tracing::warn!(error = %e, "Market poll failed, will retry next tick");
                    counter!("market_poll_failures").increment(1);
                    continue;
                }
            };

            // The consumer may have stopped us while the fetch was in
            // flight; apply nothing in that case.
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }

            let evaluations: Vec<TokenEvaluation> = snapshots
                .iter()
                .map(|snapshot| engine.evaluate(snapshot))
                .collect();

            tracing::debug!(count = evaluations.len(), "Evaluated snapshot batch");
            if evaluations_tx.send(evaluations).await.is_err() {
                tracing::info!("Evaluation consumer dropped, market poller exiting");
                break;
            }
        }
    });

    PollerHandle { stop, task }
}

/// Spawn the price-refresh loop: on every tick, fetch a fresh price for
/// each token held in the position book or the watchlist and feed it to
/// both registries. Tokens without a quotable price are skipped.
pub fn spawn_price_refresher<S, T>(engine: Arc<Engine>, source: Arc<S>, mut ticker: T) -> PollerHandle
where
    S: MarketDataSource + 'static,
    T: Ticker,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let task = tokio::spawn(async move {
        loop {
            ticker.tick().await;
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }

            // Union of both registries, deduplicated.
            let addresses: BTreeSet<String> = engine
                .positions
                .addresses()
                .into_iter()
                .chain(engine.watchlist.addresses())
                .collect();

            for address in addresses {
                let price = match source.fetch_price(&address).await {
                    Ok(Some(price)) => price,
                    Ok(None) => {
                        tracing::debug!(address = %address, "No quotable price this tick");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, address = %address, "Price refresh failed");
                        continue;
                    }
                };

                if stop_flag.load(Ordering::SeqCst) {
                    return;
                }

                if let Err(e) = engine.positions.tick(&address, price) {
                    tracing::warn!(error = %e, address = %address, "Rejected position tick");
                }
                if let Err(e) = engine.watchlist.tick(&address, price) {
                    tracing::warn!(error = %e, address = %address, "Rejected watchlist tick");
                }
            }
        }
    });

    PollerHandle { stop, task }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::errors::EngineError;
    use crate::models::MarketSnapshot;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    /// Ticker driven by a channel so tests control the schedule.
    struct ManualTicker(mpsc::Receiver<()>);

    #[async_trait]
    impl Ticker for ManualTicker {
        async fn tick(&mut self) {
            if self.0.recv().await.is_none() {
                // Sender dropped: park forever, the poller gets aborted.
                std::future::pending::<()>().await;
            }
        }
    }

    struct StubSource {
        batches: Mutex<Vec<Result<Vec<MarketSnapshot>, EngineError>>>,
        price: Option<Decimal>,
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn fetch_snapshots(&self) -> Result<Vec<MarketSnapshot>, EngineError> {
            self.batches
                .lock()
                .pop()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn fetch_price(&self, _address: &str) -> Result<Option<Decimal>, EngineError> {
            Ok(self.price)
        }
    }

    fn make_snapshot() -> MarketSnapshot {
        MarketSnapshot {
            address: "TokenAddr".into(),
            name: "Test".into(),
            symbol: "TST".into(),
            price: Decimal::ONE,
            volume_24h: Decimal::from(500_000),
            price_change_24h: Decimal::from(10),
            liquidity_usd: Decimal::from(500_000),
            price_change_1h: Some(Decimal::ONE),
            volume_1h: None,
            market_cap: Some(Decimal::from(5_000_000)),
            buys_24h: 500,
            sells_24h: 500,
            pair_created_at: None,
        }
    }

    #[tokio::test]
    async fn test_market_poller_evaluates_batches() {
        let engine = Arc::new(Engine::new(EngineConfig::default()).unwrap());
        let source = Arc::new(StubSource {
            batches: Mutex::new(vec![Ok(vec![make_snapshot()])]),
            price: None,
        });
        let (tick_tx, tick_rx) = mpsc::channel(4);
        let (eval_tx, mut eval_rx) = mpsc::channel(4);

        let handle = spawn_market_poller(engine, source, ManualTicker(tick_rx), eval_tx);

        tick_tx.send(()).await.unwrap();
        let batch = eval_rx.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].address, "TokenAddr");

        handle.stop();
    }

    #[tokio::test]
    async fn test_market_poller_forwards_empty_batches() {
        let engine = Arc::new(Engine::new(EngineConfig::default()).unwrap());
        let source = Arc::new(StubSource {
            batches: Mutex::new(vec![Ok(Vec::new())]),
            price: None,
        });
        let (tick_tx, tick_rx) = mpsc::channel(4);
        let (eval_tx, mut eval_rx) = mpsc::channel(4);

        let handle = spawn_market_poller(engine, source, ManualTicker(tick_rx), eval_tx);

        tick_tx.send(()).await.unwrap();
        let batch = eval_rx.recv().await.unwrap();
        assert!(batch.is_empty());

        handle.stop();
    }

    #[tokio::test]
    async fn test_market_poller_survives_fetch_errors() {
        let engine = Arc::new(Engine::new(EngineConfig::default()).unwrap());
        let source = Arc::new(StubSource {
            // Popped in reverse order: first an error, then a good batch.
            batches: Mutex::new(vec![
                Ok(vec![make_snapshot()]),
                Err(EngineError::DataUnavailable("boom".into())),
            ]),
            price: None,
        });
        let (tick_tx, tick_rx) = mpsc::channel(4);
        let (eval_tx, mut eval_rx) = mpsc::channel(4);

        let handle = spawn_market_poller(engine, source, ManualTicker(tick_rx), eval_tx);

        tick_tx.send(()).await.unwrap(); // errors, no batch emitted
        tick_tx.send(()).await.unwrap(); // succeeds
        let batch = eval_rx.recv().await.unwrap();
        assert_eq!(batch.len(), 1);

        handle.stop();
    }

    #[tokio::test]
    async fn test_price_refresher_ticks_registries() {
        let engine = Arc::new(Engine::new(EngineConfig::default()).unwrap());
        engine
            .positions
            .open(&make_snapshot(), Decimal::from(100))
            .unwrap();

        let source = Arc::new(StubSource {
            batches: Mutex::new(Vec::new()),
            price: Some(Decimal::new(12, 1)), // 1.2
        });
        let (tick_tx, tick_rx) = mpsc::channel(4);

        let handle = spawn_price_refresher(Arc::clone(&engine), source, ManualTicker(tick_rx));

        tick_tx.send(()).await.unwrap();

        // Wait for the tick to land on the position book.
        for _ in 0..100 {
            if engine.positions.get("TokenAddr").unwrap().current_price == Decimal::new(12, 1) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let position = engine.positions.get("TokenAddr").unwrap();
        assert_eq!(position.current_price, Decimal::new(12, 1));
        assert_eq!(position.highest_price, Decimal::new(12, 1));

        handle.stop();
    }
}
