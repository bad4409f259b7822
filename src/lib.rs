//! Crypto Direction Predictor
//!
//! Predicts the direction of the next candle for a crypto trading pair from
//! recent price history, scores free-text sentiment, and logs both.
//!
//! ## Architecture
//!
//! ```text
//! MarketDataSource (Binance) → FeatureEngine → DirectionModel → PredictionService
//!                                                  ↕                    ↓
//!                                           ArtifactStore        PredictionLogger (CSV)
//!                                                                       ↑
//!                                                               SentimentScorer
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod journal;
pub mod market;
pub mod ml;
pub mod sentiment;
pub mod service;
pub mod storage;
pub mod testing;
pub mod types;

#[cfg(test)]
mod types_tests;
