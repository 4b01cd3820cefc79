use rust_decimal::Decimal;

/// Engine-level error taxonomy.
///
/// Heuristic evaluation itself is total: for any well-formed snapshot it
/// produces a signal without erroring. Errors only arise at the data
/// boundary (`DataUnavailable`) or from invalid caller input on the
/// position/watchlist registries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The data source failed or returned a malformed payload. Recovered
    /// locally by the caller (empty result set or an Avoid sentinel),
    /// never a crash.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// Position size must be strictly positive.
    #[error("invalid position size: {0}")]
    InvalidSize(Decimal),

    /// Prices fed into the registries must be strictly positive.
    #[error("invalid price: {0}")]
    InvalidPrice(Decimal),
}

/// Configuration validation failure, reported at startup before the
/// engine is constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("entry tranche fractions must sum to 1.0, got {0}")]
    TrancheSplitInvalid(Decimal),

    #[error("support multiplier {support} and resistance multiplier {resistance} must straddle 1.0")]
    PriceTargetsInverted { support: Decimal, resistance: Decimal },

    #[error("initial stop multiplier must be below 1.0, got {0}")]
    StopAboveEntry(Decimal),

    #[error("take-profit ladder must be non-empty and strictly ascending")]
    TakeProfitLadderInvalid,

    #[error("avoid_warning_count must be at least 1")]
    AvoidGateZero,
}
