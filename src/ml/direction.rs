//! Next-candle direction model
//!
//! Trains a standardized random forest on engineered features and turns
//! its output into an UP/DOWN [`Prediction`]. Artifacts are persisted
//! through an [`ArtifactStore`]; loading and training are separate calls
//! so the caller decides when the expensive path runs.

use super::features::{FeatureEngine, TrainingSet};
use super::forest::{ForestParams, RandomForestClassifier};
use super::scaler::StandardScaler;
use crate::config::ModelConfig;
use crate::error::{PredictorError, Result};
use crate::storage::{ArtifactKey, ArtifactStore};
use crate::types::{Candle, Interval, Prediction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Bumped when the serialized artifact layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Trained classifier, scaler and the feature schema they expect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub symbol: String,
    pub interval: Interval,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub classifier: RandomForestClassifier,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// Accuracy on the held-out tail; `None` when the tail is empty
    pub validation_accuracy: Option<f64>,
}

impl ModelArtifact {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(&self.symbol, self.interval)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    /// Most recent candles used for training
    pub train_window: usize,
    /// Fraction of rows held out as the validation tail
    pub test_size: f64,
    pub forest: ForestParams,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            train_window: 500,
            test_size: 0.2,
            forest: ForestParams::default(),
        }
    }
}

impl From<&ModelConfig> for TrainingParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            train_window: config.train_window,
            test_size: config.test_size,
            forest: ForestParams {
                n_trees: config.n_trees,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                seed: config.seed,
                ..Default::default()
            },
        }
    }
}

/// Number of rows in the validation tail for `n` rows
pub fn validation_len(n: usize, test_size: f64) -> usize {
    // Guard against 500 * 0.2 landing a hair above 100
    let raw = (n as f64 * test_size - 1e-9).ceil();
    (raw.max(0.0) as usize).min(n)
}

/// Chronological split: earliest rows train, most recent tail validates.
/// Rows are never reordered.
pub fn time_split<T>(rows: &[T], test_size: f64) -> Result<(&[T], &[T])> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PredictorError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let split_at = rows.len() - validation_len(rows.len(), test_size);
    Ok(rows.split_at(split_at))
}

/// Fits and applies the direction classifier for one feature schema
#[derive(Clone)]
pub struct DirectionModel {
    engine: FeatureEngine,
    params: TrainingParams,
    store: Arc<dyn ArtifactStore>,
}

impl DirectionModel {
    pub fn new(engine: FeatureEngine, params: TrainingParams, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            engine,
            params,
            store,
        }
    }

    pub fn engine(&self) -> &FeatureEngine {
        &self.engine
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fewest candles that allow a train followed by a predict
    pub fn min_candles(&self) -> usize {
        self.engine.min_candles() + 2
    }

    /// Train on the most recent `train_window` candles
    pub fn train(&self, symbol: &str, interval: Interval, candles: &[Candle]) -> Result<ModelArtifact> {
        let window = &candles[candles.len().saturating_sub(self.params.train_window)..];
        let dataset = self.engine.training_set(window)?;
        if dataset.len() < 2 {
            return Err(PredictorError::InsufficientData {
                required: self.min_candles(),
                available: window.len(),
            });
        }

        let TrainingSet {
            feature_names,
            rows,
            targets,
            ..
        } = dataset;

        let (train_x, valid_x) = time_split(&rows, self.params.test_size)?;
        let (train_y, valid_y) = targets.split_at(train_x.len());

        let scaler = StandardScaler::fit(train_x)?;
        let scaled_train = scaler.transform_all(train_x)?;
        let classifier =
            RandomForestClassifier::fit(self.params.forest.clone(), &scaled_train, train_y)?;

        let validation_accuracy = if valid_x.is_empty() {
            None
        } else {
            let scaled_valid = scaler.transform_all(valid_x)?;
            Some(classifier.accuracy(&scaled_valid, valid_y)?)
        };

        let up_share = train_y.iter().filter(|&&t| t == 1).count() as f64 / train_y.len() as f64;
        info!(
            "Trained {} {} model: {} train rows ({:.1}% up), {} validation rows, accuracy {}",
            symbol,
            interval,
            train_x.len(),
            up_share * 100.0,
            valid_x.len(),
            validation_accuracy
                .map(|a| format!("{:.1}%", a * 100.0))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok(ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            symbol: symbol.to_string(),
            interval,
            trained_at: Utc::now(),
            feature_names,
            scaler,
            classifier,
            train_rows: train_x.len(),
            validation_rows: valid_x.len(),
            validation_accuracy,
        })
    }

    /// Predict the direction of the candle after the last one given
    pub fn predict(&self, artifact: &ModelArtifact, candles: &[Candle]) -> Result<Prediction> {
        let features = self.engine.latest(candles)?;
        if features.names != artifact.feature_names {
            return Err(PredictorError::FeatureMismatch {
                expected: artifact.feature_names.clone(),
                actual: features.names,
            });
        }

        let scaled = artifact.scaler.transform(&features.values)?;
        let prob_up = artifact.classifier.predict_proba(&scaled)?;
        debug!(
            "{} features at {}: {:?} -> prob_up {:.4}",
            artifact.symbol,
            features.open_time,
            features.iter().collect::<Vec<_>>(),
            prob_up
        );
        Ok(Prediction::from_prob_up(&artifact.symbol, prob_up))
    }

    /// Stored artifact for `key`, if any. Never trains.
    pub async fn load(&self, key: &ArtifactKey) -> Result<Option<ModelArtifact>> {
        let artifact = self.store.get(key).await?;
        if let Some(a) = &artifact {
            if a.format_version != ARTIFACT_FORMAT_VERSION {
                return Err(PredictorError::Persistence(format!(
                    "artifact {} has format version {}, expected {}",
                    key, a.format_version, ARTIFACT_FORMAT_VERSION
                )));
            }
        }
        Ok(artifact)
    }

    /// Train on `candles` and replace whatever is stored under the key
    pub async fn train_and_store(&self, key: &ArtifactKey, candles: &[Candle]) -> Result<ModelArtifact> {
        let artifact = self.train(&key.symbol, key.interval, candles)?;
        self.store.put(key, &artifact).await?;
        info!("Stored {} artifact in {}", key, self.store.name());
        Ok(artifact)
    }

    /// Load on hit; train and store on miss. Returns whether training ran.
    pub async fn load_or_train(
        &self,
        key: &ArtifactKey,
        candles: &[Candle],
    ) -> Result<(ModelArtifact, bool)> {
        match self.load(key).await? {
            Some(artifact) => {
                debug!("Using cached {} artifact from {}", key, artifact.trained_at);
                Ok((artifact, false))
            }
            None => {
                info!("No stored artifact for {}, training", key);
                Ok((self.train_and_store(key, candles).await?, true))
            }
        }
    }
}
