//! Synthetic candle series and small model settings for tests and demos

use crate::ml::{ForestParams, TrainingParams};
use crate::types::{Candle, Interval};
use chrono::{TimeZone, Utc};

const BASE_TIMESTAMP: i64 = 1_706_500_000;

/// Candles with the given closes, one `interval` apart
pub fn candles_from_closes(closes: &[f64], interval: Interval) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                open_time: Utc
                    .timestamp_opt(BASE_TIMESTAMP + i as i64 * interval.seconds(), 0)
                    .single()
                    .unwrap_or_default(),
                open,
                high: open.max(close) * 1.0005,
                low: open.min(close) * 0.9995,
                close,
                volume: 1_000.0 + (i % 7) as f64 * 25.0,
            }
        })
        .collect()
}

/// Strictly increasing closes: `start`, `start + step`, ...
pub fn trending_candles(n: usize, start: f64, step: f64) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
    candles_from_closes(&closes, Interval::OneMinute)
}

/// Wavy series with both up and down moves
pub fn oscillating_candles(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64;
            85_000.0 + x * 3.0 + (x * 0.5).sin() * 400.0 + (x * 1.7).cos() * 90.0
        })
        .collect();
    candles_from_closes(&closes, Interval::OneMinute)
}

/// Few shallow trees so tests train quickly
pub fn small_training_params() -> TrainingParams {
    TrainingParams {
        train_window: 500,
        test_size: 0.2,
        forest: ForestParams {
            n_trees: 20,
            max_depth: 4,
            ..Default::default()
        },
    }
}
