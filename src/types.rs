//! Core domain types shared across modules

use crate::error::{PredictorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading pairs offered to the user: (display name, exchange code)
pub const SUPPORTED_SYMBOLS: &[(&str, &str)] = &[
    ("Bitcoin", "BTCUSDT"),
    ("Ethereum", "ETHUSDT"),
    ("BNB", "BNBUSDT"),
    ("Solana", "SOLUSDT"),
];

/// Normalize a symbol code and check it against the supported set
pub fn parse_symbol(raw: &str, allowed: &[String]) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if allowed.iter().any(|s| s.eq_ignore_ascii_case(&symbol)) {
        Ok(symbol)
    } else {
        Err(PredictorError::InvalidInput(format!(
            "unsupported symbol '{}', expected one of {}",
            raw,
            allowed.join(", ")
        )))
    }
}

/// Display name for a supported symbol code
pub fn symbol_display_name(symbol: &str) -> Option<&'static str> {
    SUPPORTED_SYMBOLS
        .iter()
        .find(|(_, code)| code.eq_ignore_ascii_case(symbol))
        .map(|(name, _)| *name)
}

/// One OHLCV observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candle interval codes accepted by the quote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
        }
    }

    /// Length of one candle in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::OneMinute => 60,
            Interval::FiveMinutes => 300,
            Interval::FifteenMinutes => 900,
            Interval::OneHour => 3600,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "1h" => Ok(Interval::OneHour),
            other => Err(PredictorError::InvalidInput(format!(
                "unsupported interval '{}', expected one of 1m, 5m, 15m, 1h",
                other
            ))),
        }
    }
}

/// Predicted direction of the next candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.pad("UP"),
            Direction::Down => f.pad("DOWN"),
        }
    }
}

/// Probability that the next candle closes higher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub prob_up: f64,
    pub prob_down: f64,
    pub label: Direction,
}

impl Prediction {
    /// Build from the classifier's up-probability. Ties go to UP.
    pub fn from_prob_up(symbol: impl Into<String>, prob_up: f64) -> Self {
        let prob_up = if prob_up.is_finite() {
            prob_up.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let label = if prob_up >= 0.5 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            symbol: symbol.into(),
            prob_up,
            prob_down: 1.0 - prob_up,
            label,
        }
    }
}

/// Three-way sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => f.pad("POSITIVE"),
            SentimentLabel::Neutral => f.pad("NEUTRAL"),
            SentimentLabel::Negative => f.pad("NEGATIVE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub polarity: f64,
    pub label: SentimentLabel,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// One row of the prediction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    pub prob_up: f64,
    pub prob_down: f64,
    pub pred_label: Direction,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub text: String,
}

impl LogRecord {
    pub fn join(
        timestamp: DateTime<Utc>,
        price: f64,
        prediction: &Prediction,
        sentiment: &SentimentResult,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            symbol: prediction.symbol.clone(),
            price,
            prob_up: prediction.prob_up,
            prob_down: prediction.prob_down,
            pred_label: prediction.label,
            sentiment_score: sentiment.polarity,
            sentiment_label: sentiment.label,
            text: text.into(),
        }
    }
}

/// Header metrics for the latest candles of a symbol
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub latest_close: f64,
    pub previous_close: f64,
    /// Percent change over the last candle
    pub pct_change: f64,
    pub last_open_time: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn from_candles(candles: &[Candle]) -> Result<Self> {
        let n = candles.len();
        if n < 2 {
            return Err(PredictorError::InsufficientData {
                required: 2,
                available: n,
            });
        }
        let latest = &candles[n - 1];
        let previous = &candles[n - 2];
        if previous.close == 0.0 {
            return Err(PredictorError::InvalidData(
                "previous close is zero".to_string(),
            ));
        }
        Ok(Self {
            latest_close: latest.close,
            previous_close: previous.close,
            pct_change: (latest.close / previous.close - 1.0) * 100.0,
            last_open_time: latest.open_time,
        })
    }
}
