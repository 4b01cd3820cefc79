pub mod poller;

pub use poller::{spawn_market_poller, spawn_price_refresher, IntervalTicker, PollerHandle, Ticker};
