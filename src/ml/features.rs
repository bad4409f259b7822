//! Feature engineering from raw candle series
//!
//! Each feature is computed from a rolling window of closes ending at a
//! reference index. A reference index is valid once every window in the
//! feature set is fully populated, so a series of `n` candles yields
//! `n - W` feature rows where `W` is the longest lookback, and `n - W - 1`
//! training rows (the last row has no forward return).

use crate::error::{PredictorError, Result};
use crate::types::Candle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single engineered feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Close-to-close return over `n` candles
    Return(usize),
    /// Simple moving average of close over `n` candles
    MovingAverage(usize),
    /// Sample standard deviation of 1-candle returns over `n` candles
    Volatility(usize),
}

impl Feature {
    pub fn name(&self) -> String {
        match self {
            Feature::Return(n) => format!("ret_{}", n),
            Feature::MovingAverage(n) => format!("ma_{}", n),
            Feature::Volatility(n) => format!("vol_{}", n),
        }
    }

    /// Number of candles before the reference index the feature reads
    pub fn lookback(&self) -> usize {
        match self {
            Feature::Return(n) => *n,
            Feature::MovingAverage(n) => n - 1,
            Feature::Volatility(n) => *n,
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = match self {
            Feature::Return(n) | Feature::MovingAverage(n) => *n >= 1,
            Feature::Volatility(n) => *n >= 2,
        };
        if ok {
            Ok(())
        } else {
            Err(PredictorError::InvalidInput(format!(
                "feature window too small: {}",
                self.name()
            )))
        }
    }

    /// Value at reference index `t`. Caller guarantees `t >= lookback()`.
    fn compute(&self, closes: &[f64], t: usize) -> f64 {
        match *self {
            Feature::Return(n) => closes[t] / closes[t - n] - 1.0,
            Feature::MovingAverage(n) => {
                let window = &closes[t + 1 - n..=t];
                window.iter().sum::<f64>() / n as f64
            }
            Feature::Volatility(n) => {
                let returns: Vec<f64> = closes[t - n..=t]
                    .windows(2)
                    .map(|w| w[1] / w[0] - 1.0)
                    .collect();
                let mean = returns.iter().sum::<f64>() / n as f64;
                let variance =
                    returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                variance.sqrt()
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ordered list of features. Order is part of the model contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            features: vec![
                Feature::Return(1),
                Feature::Return(3),
                Feature::Return(5),
                Feature::MovingAverage(5),
                Feature::MovingAverage(10),
                Feature::Volatility(5),
                Feature::Volatility(10),
            ],
        }
    }
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        if features.is_empty() {
            return Err(PredictorError::InvalidInput(
                "feature set must not be empty".to_string(),
            ));
        }
        for feature in &features {
            feature.validate()?;
        }
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(Feature::name).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Longest lookback in the set (W)
    pub fn max_lookback(&self) -> usize {
        self.features.iter().map(Feature::lookback).max().unwrap_or(0)
    }

    /// Fewest candles that produce one feature row
    pub fn min_candles(&self) -> usize {
        self.max_lookback() + 1
    }
}

/// Named feature values at one reference candle
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub open_time: DateTime<Utc>,
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// Feature rows paired with next-candle direction targets, in time order
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    /// 1 if the next close is higher than the current close, else 0
    pub targets: Vec<u8>,
    pub open_times: Vec<DateTime<Utc>>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derives feature vectors from candle series
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    set: FeatureSet,
}

impl FeatureEngine {
    pub fn new(set: FeatureSet) -> Self {
        Self { set }
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.set
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.set.names()
    }

    pub fn min_candles(&self) -> usize {
        self.set.min_candles()
    }

    /// One feature vector per valid reference index
    pub fn build(&self, candles: &[Candle]) -> Result<Vec<FeatureVector>> {
        let closes = self.checked_closes(candles)?;
        let names = self.set.names();
        let start = self.set.max_lookback();

        (start..candles.len())
            .map(|t| {
                Ok(FeatureVector {
                    open_time: candles[t].open_time,
                    names: names.clone(),
                    values: self.row_at(&closes, t)?,
                })
            })
            .collect()
    }

    /// Feature vector at the most recent candle
    pub fn latest(&self, candles: &[Candle]) -> Result<FeatureVector> {
        let closes = self.checked_closes(candles)?;
        let t = candles.len() - 1;
        Ok(FeatureVector {
            open_time: candles[t].open_time,
            names: self.set.names(),
            values: self.row_at(&closes, t)?,
        })
    }

    /// Feature rows with forward-return targets. The final candle is
    /// excluded because its next close is unknown.
    pub fn training_set(&self, candles: &[Candle]) -> Result<TrainingSet> {
        let closes = self.checked_closes(candles)?;
        let start = self.set.max_lookback();
        let end = candles.len() - 1;

        let mut rows = Vec::with_capacity(end.saturating_sub(start));
        let mut targets = Vec::with_capacity(rows.capacity());
        let mut open_times = Vec::with_capacity(rows.capacity());

        for t in start..end {
            let forward_return = closes[t + 1] / closes[t] - 1.0;
            rows.push(self.row_at(&closes, t)?);
            targets.push(u8::from(forward_return > 0.0));
            open_times.push(candles[t].open_time);
        }

        Ok(TrainingSet {
            feature_names: self.set.names(),
            rows,
            targets,
            open_times,
        })
    }

    fn checked_closes(&self, candles: &[Candle]) -> Result<Vec<f64>> {
        let required = self.set.min_candles();
        if candles.len() < required {
            return Err(PredictorError::InsufficientData {
                required,
                available: candles.len(),
            });
        }
        if let Some(pair) = candles
            .windows(2)
            .find(|w| w[1].open_time <= w[0].open_time)
        {
            return Err(PredictorError::InvalidData(format!(
                "candles not strictly ascending at {}",
                pair[1].open_time
            )));
        }
        Ok(candles.iter().map(|c| c.close).collect())
    }

    fn row_at(&self, closes: &[f64], t: usize) -> Result<Vec<f64>> {
        let row: Vec<f64> = self
            .set
            .features()
            .iter()
            .map(|f| f.compute(closes, t))
            .collect();
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError::InvalidData(format!(
                "non-finite {} at candle {}",
                self.set.features()[i],
                t
            )));
        }
        Ok(row)
    }
}
