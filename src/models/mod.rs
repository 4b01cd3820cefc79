pub mod metrics;
pub mod notification;
pub mod position;
pub mod signal;
pub mod snapshot;
pub mod watchlist;

pub use self::metrics::DerivedMetrics;
pub use notification::{Notification, NotificationKind, Priority};
pub use position::Position;
pub use signal::{Indicator, IndicatorSet, Signal, TradingSignal, Trend};
pub use snapshot::MarketSnapshot;
pub use watchlist::{AlertDirection, PriceAlert, WatchlistItem};
