//! Market data access
//!
//! Candle series and spot prices come from an external quote API behind the
//! [`MarketDataSource`] trait so the prediction service can be driven by a
//! mock in tests.

mod binance;
#[cfg(test)]
mod tests;

pub use binance::{parse_klines, parse_ticker_price, BinanceClient};

use crate::error::Result;
use crate::types::{Candle, Interval};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` candles, ascending by open time
    async fn get_candles(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>>;

    /// Latest traded price
    async fn get_latest_price(&self, symbol: &str) -> Result<f64>;
}
