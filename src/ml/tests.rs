//! Integration tests for ML module

use super::*;
use crate::error::PredictorError;
use crate::storage::{ArtifactKey, ArtifactStore, InMemoryArtifactStore};
use crate::testing::{oscillating_candles, small_training_params, trending_candles};
use crate::types::{Direction, Interval};
use std::sync::Arc;

fn model_with(engine: FeatureEngine, store: Arc<InMemoryArtifactStore>) -> DirectionModel {
    DirectionModel::new(engine, small_training_params(), store)
}

fn default_model() -> DirectionModel {
    model_with(FeatureEngine::default(), Arc::new(InMemoryArtifactStore::new()))
}

#[test]
fn test_training_rows_have_no_missing_values() {
    let engine = FeatureEngine::default();
    let candles = oscillating_candles(240);
    let set = engine.training_set(&candles).unwrap();

    assert_eq!(set.len(), 240 - 10 - 1);
    assert!(set.rows.iter().flatten().all(|v| v.is_finite()));
    assert!(set.rows.iter().all(|r| r.len() == set.feature_names.len()));
    assert!(set.open_times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_feature_engine_is_deterministic() {
    let engine = FeatureEngine::default();
    let candles = oscillating_candles(150);

    let a = engine.training_set(&candles).unwrap();
    let b = engine.training_set(&candles).unwrap();
    let bits = |s: &TrainingSet| -> Vec<u64> {
        s.rows.iter().flatten().map(|v| v.to_bits()).collect()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.targets, b.targets);
}

#[test]
fn test_time_split_500_rows() {
    let rows: Vec<usize> = (0..500).collect();
    let (train, valid) = time_split(&rows, 0.2).unwrap();

    assert_eq!(train.len(), 400);
    assert_eq!(valid.len(), 100);
    assert_eq!(train, &rows[..400]);
    assert_eq!(valid, &rows[400..]);
    assert_eq!(valid.first(), Some(&400));
    assert_eq!(valid.last(), Some(&499));
}

#[test]
fn test_validation_len_rounds_up() {
    assert_eq!(validation_len(10, 0.25), 3);
    assert_eq!(validation_len(2, 0.2), 1);
    assert_eq!(validation_len(0, 0.2), 0);
}

#[test]
fn test_time_split_rejects_bad_test_size() {
    let rows = [1, 2, 3];
    assert!(time_split(&rows, 0.0).is_err());
    assert!(time_split(&rows, 1.0).is_err());
}

#[test]
fn test_train_records_split_sizes() {
    let model = default_model();
    let candles = oscillating_candles(511);
    let artifact = model.train("BTCUSDT", Interval::OneMinute, &candles).unwrap();

    // 500-candle window -> 489 rows -> 98 validation
    assert_eq!(artifact.train_rows + artifact.validation_rows, 489);
    assert_eq!(artifact.validation_rows, 98);
    assert!(artifact.validation_accuracy.is_some());
    assert_eq!(artifact.feature_names, FeatureSet::default().names());
    assert_eq!(artifact.symbol, "BTCUSDT");
}

#[test]
fn test_train_needs_two_rows() {
    let model = default_model();
    let err = model
        .train("BTCUSDT", Interval::OneMinute, &trending_candles(12, 100.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, PredictorError::InsufficientData { .. }));
}

#[test]
fn test_increasing_series_predicts_up() {
    let model = default_model();
    let candles = trending_candles(100, 100.0, 0.5);
    let artifact = model.train("BTCUSDT", Interval::OneMinute, &candles).unwrap();
    let prediction = model.predict(&artifact, &candles).unwrap();

    assert!(prediction.prob_up > 0.5);
    assert_eq!(prediction.label, Direction::Up);
}

#[test]
fn test_prediction_probabilities_are_consistent() {
    let model = default_model();
    let candles = oscillating_candles(300);
    let artifact = model.train("ETHUSDT", Interval::FiveMinutes, &candles).unwrap();

    for end in 250..=300 {
        let p = model.predict(&artifact, &candles[..end]).unwrap();
        assert!((p.prob_up + p.prob_down - 1.0).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&p.prob_up));
        assert_eq!(p.label == Direction::Up, p.prob_up >= 0.5);
    }
}

#[test]
fn test_feature_mismatch_is_fatal() {
    let narrow = FeatureEngine::new(
        FeatureSet::new(vec![Feature::Return(1), Feature::Return(3)]).unwrap(),
    );
    let wide = FeatureEngine::new(
        FeatureSet::new(vec![
            Feature::Return(1),
            Feature::Return(3),
            Feature::MovingAverage(5),
        ])
        .unwrap(),
    );
    let store = Arc::new(InMemoryArtifactStore::new());
    let candles = oscillating_candles(120);

    let artifact = model_with(narrow, store.clone())
        .train("BTCUSDT", Interval::OneMinute, &candles)
        .unwrap();
    let err = model_with(wide, store).predict(&artifact, &candles).unwrap_err();

    match err {
        PredictorError::FeatureMismatch { expected, actual } => {
            assert_eq!(expected, vec!["ret_1", "ret_3"]);
            assert_eq!(actual, vec!["ret_1", "ret_3", "ma_5"]);
        }
        other => panic!("expected FeatureMismatch, got {:?}", other),
    }
}

#[test]
fn test_predict_with_too_few_candles() {
    let model = default_model();
    let candles = oscillating_candles(120);
    let artifact = model.train("BTCUSDT", Interval::OneMinute, &candles).unwrap();
    let err = model.predict(&artifact, &candles[..5]).unwrap_err();
    assert!(matches!(err, PredictorError::InsufficientData { .. }));
}

#[test]
fn test_training_is_reproducible() {
    let model = default_model();
    let candles = oscillating_candles(200);
    let a = model.train("BTCUSDT", Interval::OneMinute, &candles).unwrap();
    let b = model.train("BTCUSDT", Interval::OneMinute, &candles).unwrap();
    assert_eq!(a.classifier, b.classifier);
    assert_eq!(a.scaler, b.scaler);
}

#[tokio::test]
async fn test_load_or_train_trains_once() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let model = model_with(FeatureEngine::default(), store.clone());
    let key = ArtifactKey::new("BTCUSDT", Interval::OneMinute);
    let candles = oscillating_candles(150);

    assert!(model.load(&key).await.unwrap().is_none());

    let (first, trained) = model.load_or_train(&key, &candles).await.unwrap();
    assert!(trained);
    assert_eq!(store.len(), 1);

    let (second, trained) = model.load_or_train(&key, &candles).await.unwrap();
    assert!(!trained);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_train_and_store_replaces_artifact() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let model = model_with(FeatureEngine::default(), store.clone());
    let key = ArtifactKey::new("SOLUSDT", Interval::OneHour);

    let old = model
        .train_and_store(&key, &oscillating_candles(100))
        .await
        .unwrap();
    let new = model
        .train_and_store(&key, &oscillating_candles(200))
        .await
        .unwrap();
    assert_ne!(old.train_rows, new.train_rows);

    let loaded = store.get(&key).await.unwrap().unwrap();
    assert_eq!(loaded.train_rows, new.train_rows);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_load_rejects_unknown_format_version() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let model = model_with(FeatureEngine::default(), store.clone());
    let key = ArtifactKey::new("BTCUSDT", Interval::OneMinute);

    let mut artifact = model.train("BTCUSDT", Interval::OneMinute, &oscillating_candles(100)).unwrap();
    artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
    store.put(&key, &artifact).await.unwrap();

    assert!(matches!(
        model.load(&key).await,
        Err(PredictorError::Persistence(_))
    ));
}
