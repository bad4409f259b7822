//! Machine learning pipeline
//!
//! Provides next-candle direction prediction with:
//! - Feature engineering from candle series (returns, moving averages, volatility)
//! - Standardization fitted on the training split only
//! - Random forest classification with soft probabilities
//! - Chronological train/validation split and artifact persistence

pub mod direction;
pub mod features;
pub mod forest;
pub mod scaler;

#[cfg(test)]
mod tests;

pub use direction::{
    time_split, validation_len, DirectionModel, ModelArtifact, TrainingParams,
    ARTIFACT_FORMAT_VERSION,
};
pub use features::{Feature, FeatureEngine, FeatureSet, FeatureVector, TrainingSet};
pub use forest::{DecisionTree, ForestParams, RandomForestClassifier};
pub use scaler::StandardScaler;
