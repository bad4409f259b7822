//! Process-wide wiring from configuration to services

use crate::config::AppConfig;
use crate::error::Result;
use crate::journal::PredictionLogger;
use crate::market::{BinanceClient, MarketDataSource};
use crate::ml::{DirectionModel, FeatureEngine, TrainingParams};
use crate::sentiment::SentimentScorer;
use crate::service::PredictionService;
use crate::storage::{ArtifactStore, FileArtifactStore};
use crate::types::{parse_symbol, Interval};
use std::sync::Arc;
use tracing::info;

/// Everything a CLI action needs, built once per process
pub struct AppContext {
    pub config: AppConfig,
    pub service: PredictionService,
    pub scorer: SentimentScorer,
    pub logger: PredictionLogger,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let source: Arc<dyn MarketDataSource> = Arc::new(BinanceClient::new(&config.market)?);
        let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(config.model.dir_path()));
        Ok(Self::with_parts(config, source, store))
    }

    /// Wire explicit data source and artifact store backends
    pub fn with_parts(
        config: AppConfig,
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        info!(
            "Using {} market data, {} artifact store, log {}",
            config.market.base_url,
            store.name(),
            config.journal.file_path().display()
        );

        let model = DirectionModel::new(
            FeatureEngine::default(),
            TrainingParams::from(&config.model),
            store,
        );
        let service = PredictionService::new(source, model, config.market.candle_limit);
        let logger = PredictionLogger::new(config.journal.file_path());

        Self {
            config,
            service,
            scorer: SentimentScorer::default(),
            logger,
        }
    }

    /// Validate a user-supplied symbol against the configured list
    pub fn symbol(&self, raw: &str) -> Result<String> {
        parse_symbol(raw, &self.config.symbols)
    }

    /// Parse an interval, falling back to the configured default
    pub fn interval(&self, raw: Option<&str>) -> Result<Interval> {
        match raw {
            Some(s) => s.parse(),
            None => Ok(self.config.default_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use crate::market::MockMarketDataSource;
    use crate::storage::InMemoryArtifactStore;

    fn context() -> AppContext {
        AppContext::with_parts(
            AppConfig::default(),
            Arc::new(MockMarketDataSource::new()),
            Arc::new(InMemoryArtifactStore::new()),
        )
    }

    #[test]
    fn test_symbol_validation() {
        let ctx = context();
        assert_eq!(ctx.symbol("ethusdt").unwrap(), "ETHUSDT");
        assert!(matches!(
            ctx.symbol("DOGEUSDT"),
            Err(PredictorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_interval_defaults() {
        let ctx = context();
        assert_eq!(ctx.interval(None).unwrap(), Interval::OneMinute);
        assert_eq!(ctx.interval(Some("15m")).unwrap(), Interval::FifteenMinutes);
        assert!(ctx.interval(Some("4h")).is_err());
    }

    #[test]
    fn test_model_uses_configured_params() {
        let ctx = context();
        let params = ctx.service.model().params();
        assert_eq!(params.forest.n_trees, 200);
        assert_eq!(params.train_window, 500);
    }
}
