use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::MarketSnapshot;

/// Seam to the market-data collaborator. The transport (HTTP client,
/// rate limiting, timeouts) lives on the other side of this trait; the
/// core only sees validated snapshots.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the current snapshot batch. An empty list is a valid,
    /// non-error result; `DataUnavailable` is reserved for transport or
    /// decode failure.
    async fn fetch_snapshots(&self) -> Result<Vec<MarketSnapshot>, EngineError>;

    /// Fetch the current price for one token. `None` means the token has
    /// no quotable pair right now.
    async fn fetch_price(&self, address: &str) -> Result<Option<Decimal>, EngineError>;
}

// ---------------------------------------------------------------------------
// Upstream pair payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WindowedDto {
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LiquidityDto {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TxnWindowDto {
    #[serde(default)]
    pub buys: Option<u32>,
    #[serde(default)]
    pub sells: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TxnsDto {
    #[serde(default)]
    pub h24: Option<TxnWindowDto>,
}

/// Raw pair object as served by the screener API. Everything the
/// upstream marks optional stays optional here; the strict checks happen
/// in [`parse_pair`], not in field access scattered through the core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDto {
    pub base_token: TokenDto,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub price_change: WindowedDto,
    #[serde(default)]
    pub volume: WindowedDto,
    #[serde(default)]
    pub liquidity: LiquidityDto,
    #[serde(default)]
    pub txns: TxnsDto,
    /// Fully diluted valuation, used as the market-cap estimate.
    #[serde(default)]
    pub fdv: Option<f64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub pair_created_at: Option<i64>,
}

// ---------------------------------------------------------------------------
// Strict parse
// ---------------------------------------------------------------------------

fn decimal_field(value: f64, field: &str) -> Result<Decimal, EngineError> {
    Decimal::from_f64(value)
        .ok_or_else(|| EngineError::DataUnavailable(format!("non-finite {field}: {value}")))
}

fn optional_decimal(value: Option<f64>, field: &str) -> Result<Option<Decimal>, EngineError> {
    value.map(|v| decimal_field(v, field)).transpose()
}

/// Convert one raw pair into a validated snapshot.
///
/// Rejects missing addresses, unparseable or negative prices, and any
/// non-finite numeric field, so downstream evaluation never sees a
/// malformed shape.
pub fn parse_pair(dto: &PairDto) -> Result<MarketSnapshot, EngineError> {
    let address = dto
        .base_token
        .address
        .clone()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| EngineError::DataUnavailable("pair missing token address".into()))?;

    let price_raw = dto
        .price_usd
        .as_deref()
        .ok_or_else(|| EngineError::DataUnavailable(format!("{address}: missing priceUsd")))?;
    let price: Decimal = price_raw
        .parse()
        .map_err(|_| EngineError::DataUnavailable(format!("{address}: bad priceUsd {price_raw:?}")))?;
    if price < Decimal::ZERO {
        return Err(EngineError::DataUnavailable(format!(
            "{address}: negative price {price}"
        )));
    }

    let txns = dto.txns.h24.clone().unwrap_or_default();

    Ok(MarketSnapshot {
        name: dto.base_token.name.clone().unwrap_or_else(|| "Unknown".into()),
        symbol: dto.base_token.symbol.clone().unwrap_or_else(|| "Unknown".into()),
        price,
        volume_24h: decimal_field(dto.volume.h24.unwrap_or(0.0), "volume.h24")?,
        price_change_24h: decimal_field(dto.price_change.h24.unwrap_or(0.0), "priceChange.h24")?,
        liquidity_usd: decimal_field(dto.liquidity.usd.unwrap_or(0.0), "liquidity.usd")?,
        price_change_1h: optional_decimal(dto.price_change.h1, "priceChange.h1")?,
        volume_1h: optional_decimal(dto.volume.h1, "volume.h1")?,
        market_cap: optional_decimal(dto.fdv, "fdv")?,
        buys_24h: txns.buys.unwrap_or(0),
        sells_24h: txns.sells.unwrap_or(0),
        pair_created_at: dto.pair_created_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        address,
    })
}

/// Decode a raw JSON pair array into snapshots. Pairs that fail the
/// strict checks are dropped with a warning rather than poisoning the
/// whole batch.
pub fn parse_pairs(raw: &str) -> Result<Vec<MarketSnapshot>, EngineError> {
    let dtos: Vec<PairDto> = serde_json::from_str(raw)
        .map_err(|e| EngineError::DataUnavailable(format!("pair payload decode failed: {e}")))?;

    let mut snapshots = Vec::with_capacity(dtos.len());
    for dto in &dtos {
        match parse_pair(dto) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed pair");
            }
        }
    }
    Ok(snapshots)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
