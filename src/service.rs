//! Prediction service
//!
//! Glues the market data source to the direction model: fetch recent
//! candles, reuse or train the stored artifact, predict the next candle.

use crate::error::{PredictorError, Result};
use crate::market::MarketDataSource;
use crate::ml::{DirectionModel, ModelArtifact};
use crate::storage::ArtifactKey;
use crate::types::{Candle, Interval, MarketSnapshot, Prediction};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    /// Close of the latest candle used for features
    pub price: f64,
    pub candles_used: usize,
    /// Whether a model was trained for this request
    pub trained: bool,
}

pub struct PredictionService {
    source: Arc<dyn MarketDataSource>,
    model: DirectionModel,
    candle_limit: usize,
}

impl PredictionService {
    pub fn new(source: Arc<dyn MarketDataSource>, model: DirectionModel, candle_limit: usize) -> Self {
        Self {
            source,
            model,
            candle_limit,
        }
    }

    pub fn model(&self) -> &DirectionModel {
        &self.model
    }

    pub async fn predict(&self, symbol: &str, interval: Interval, retrain: bool) -> Result<PredictionOutcome> {
        let candles = self.history(symbol, interval).await?;
        let key = ArtifactKey::new(symbol, interval);

        let (artifact, trained) = if retrain {
            (self.model.train_and_store(&key, &candles).await?, true)
        } else {
            self.model.load_or_train(&key, &candles).await?
        };

        let prediction = self.model.predict(&artifact, &candles)?;
        let price = candles.last().map(|c| c.close).unwrap_or_default();

        info!(
            "{} {}: {} (up {:.1}%, down {:.1}%) at {}",
            key,
            if trained { "fresh model" } else { "stored model" },
            prediction.label,
            prediction.prob_up * 100.0,
            prediction.prob_down * 100.0,
            price
        );

        Ok(PredictionOutcome {
            prediction,
            price,
            candles_used: candles.len(),
            trained,
        })
    }

    /// Explicit retrain; replaces the stored artifact
    pub async fn train(&self, symbol: &str, interval: Interval) -> Result<ModelArtifact> {
        let candles = self.history(symbol, interval).await?;
        self.model
            .train_and_store(&ArtifactKey::new(symbol, interval), &candles)
            .await
    }

    pub async fn snapshot(&self, symbol: &str, interval: Interval) -> Result<MarketSnapshot> {
        let candles = self.candles(symbol, interval, self.candle_limit).await?;
        MarketSnapshot::from_candles(&candles).map_err(|e| unavailable(symbol, e))
    }

    pub async fn candles(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>> {
        self.source
            .get_candles(symbol, interval, limit)
            .await
            .map_err(|e| unavailable(symbol, e))
    }

    pub async fn latest_price(&self, symbol: &str) -> Result<f64> {
        self.source
            .get_latest_price(symbol)
            .await
            .map_err(|e| unavailable(symbol, e))
    }

    /// Candles for training and prediction; short history is unavailable data
    async fn history(&self, symbol: &str, interval: Interval) -> Result<Vec<Candle>> {
        let candles = self.candles(symbol, interval, self.candle_limit).await?;
        let required = self.model.min_candles();
        if candles.len() < required {
            warn!(
                "{} {}: only {} candles, need {}",
                symbol,
                interval,
                candles.len(),
                required
            );
            return Err(PredictorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("need {} candles, got {}", required, candles.len()),
            });
        }
        Ok(candles)
    }
}

fn unavailable(symbol: &str, err: PredictorError) -> PredictorError {
    match err {
        PredictorError::DataUnavailable { .. } => err,
        other => PredictorError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: other.to_string(),
        },
    }
}
