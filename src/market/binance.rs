//! Binance public REST client for klines and ticker prices

use super::MarketDataSource;
use crate::config::{MarketConfig, MAX_CANDLE_LIMIT};
use crate::error::{PredictorError, Result};
use crate::types::{Candle, Interval};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

/// Fields per kline record: open time, OHLCV, close time and six
/// auxiliary fields we ignore
const KLINE_FIELDS: usize = 12;

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_body(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(PredictorError::Upstream(format!(
                "{} returned HTTP {}: {}",
                path, status, snippet
            )));
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn get_candles(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>> {
        let limit = limit.clamp(1, MAX_CANDLE_LIMIT);
        let body = self
            .get_body(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_uppercase()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = parse_klines(&body)?;
        debug!("Fetched {} {} {} candles", candles.len(), symbol, interval);
        Ok(candles)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        let body = self
            .get_body("/api/v3/ticker/price", &[("symbol", symbol.to_uppercase())])
            .await?;
        parse_ticker_price(&body)
    }
}

fn malformed(detail: impl std::fmt::Display) -> PredictorError {
    PredictorError::Upstream(format!("malformed payload: {}", detail))
}

/// Numeric kline field; the API sends decimals as strings
fn decimal_field(value: &Value, what: &str, row: usize) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok().and_then(|d| d.to_f64()),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(malformed(format!("bad {} in record {}: {}", what, row, value))),
    }
}

/// Parse a klines response into candles sorted by open time, dropping
/// duplicate open times
pub fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let value: Value = serde_json::from_str(body).map_err(malformed)?;
    let records = value
        .as_array()
        .ok_or_else(|| malformed(format!("expected array, got {}", type_name(&value))))?;

    let mut candles = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let fields = record
            .as_array()
            .filter(|f| f.len() == KLINE_FIELDS)
            .ok_or_else(|| malformed(format!("record {} is not a {}-field array", i, KLINE_FIELDS)))?;

        let open_ms = fields[0]
            .as_i64()
            .ok_or_else(|| malformed(format!("bad open time in record {}", i)))?;
        let open_time = Utc
            .timestamp_millis_opt(open_ms)
            .single()
            .ok_or_else(|| malformed(format!("open time out of range in record {}", i)))?;

        candles.push(Candle {
            open_time,
            open: decimal_field(&fields[1], "open", i)?,
            high: decimal_field(&fields[2], "high", i)?,
            low: decimal_field(&fields[3], "low", i)?,
            close: decimal_field(&fields[4], "close", i)?,
            volume: decimal_field(&fields[5], "volume", i)?,
        });
    }

    candles.sort_by_key(|c| c.open_time);
    let before = candles.len();
    candles.dedup_by_key(|c| c.open_time);
    if candles.len() != before {
        warn!("Dropped {} duplicate candles", before - candles.len());
    }
    Ok(candles)
}

/// Parse a ticker price response (`{"symbol": "...", "price": "..."}`)
pub fn parse_ticker_price(body: &str) -> Result<f64> {
    let ticker: TickerPrice = serde_json::from_str(body).map_err(malformed)?;
    let price = Decimal::from_str(&ticker.price)
        .map_err(|e| malformed(format!("bad price '{}': {}", ticker.price, e)))?;
    if price <= Decimal::ZERO {
        return Err(malformed(format!("non-positive price {}", price)));
    }
    price
        .to_f64()
        .ok_or_else(|| malformed(format!("price {} out of range", price)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
