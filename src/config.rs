//! Application configuration
//!
//! Loaded once per process from an optional TOML file layered with
//! `PREDICTOR__*` environment overrides, then handed to each service.

use crate::error::{PredictorError, Result};
use crate::ml::FeatureSet;
use crate::types::{Interval, SUPPORTED_SYMBOLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on candles per klines request
pub const MAX_CANDLE_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub model: ModelConfig,
    pub journal: JournalConfig,
    /// Trading pairs accepted from the user
    pub symbols: Vec<String>,
    pub default_interval: Interval,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            model: ModelConfig::default(),
            journal: JournalConfig::default(),
            symbols: SUPPORTED_SYMBOLS
                .iter()
                .map(|(_, code)| code.to_string())
                .collect(),
            default_interval: Interval::OneMinute,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Candles fetched per prediction
    pub candle_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            timeout_secs: 10,
            candle_limit: 500,
        }
    }
}

impl MarketConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding one artifact per symbol/interval
    pub dir: String,
    /// Most recent candles used for training
    pub train_window: usize,
    /// Fraction of rows held out as the validation tail
    pub test_size: f64,
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: "models".to_string(),
            train_window: 500,
            test_size: 0.2,
            n_trees: 200,
            max_depth: 8,
            min_samples_split: 4,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl ModelConfig {
    pub fn dir_path(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: "logs/predictions_log.csv".to_string(),
        }
    }
}

impl JournalConfig {
    pub fn file_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

impl AppConfig {
    /// Load from `path` (optional) and the environment, then validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("PREDICTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if !(model.test_size > 0.0 && model.test_size < 1.0) {
            return Err(PredictorError::Config(format!(
                "model.test_size must be in (0, 1), got {}",
                model.test_size
            )));
        }
        if model.n_trees == 0 {
            return Err(PredictorError::Config("model.n_trees must be > 0".to_string()));
        }
        if model.max_depth == 0 {
            return Err(PredictorError::Config("model.max_depth must be > 0".to_string()));
        }

        let min_candles = FeatureSet::default().min_candles();
        if model.train_window < min_candles + 2 {
            return Err(PredictorError::Config(format!(
                "model.train_window must be at least {}, got {}",
                min_candles + 2,
                model.train_window
            )));
        }
        if self.market.candle_limit < min_candles + 2 {
            return Err(PredictorError::Config(format!(
                "market.candle_limit must be at least {}, got {}",
                min_candles + 2,
                self.market.candle_limit
            )));
        }
        if self.market.candle_limit > MAX_CANDLE_LIMIT {
            return Err(PredictorError::Config(format!(
                "market.candle_limit must be at most {}, got {}",
                MAX_CANDLE_LIMIT, self.market.candle_limit
            )));
        }
        if self.market.timeout_secs == 0 {
            return Err(PredictorError::Config(
                "market.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.symbols.is_empty() {
            return Err(PredictorError::Config("symbols must not be empty".to_string()));
        }
        Ok(())
    }
}
