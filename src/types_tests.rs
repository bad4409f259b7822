//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use crate::error::PredictorError;
    use chrono::{TimeZone, Utc};

    fn candle(minute: i64, close: f64) -> Candle {
        Candle {
            open_time: Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"UP\"");
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"DOWN\"");
    }

    #[test]
    fn test_sentiment_label_serialization() {
        let label: SentimentLabel = serde_json::from_str("\"NEGATIVE\"").unwrap();
        assert_eq!(label, SentimentLabel::Negative);
        assert_eq!(SentimentLabel::Positive.to_string(), "POSITIVE");
    }

    #[test]
    fn test_interval_round_trip_codes() {
        for interval in Interval::ALL {
            let parsed: Interval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, interval);
        }
        assert_eq!(Interval::FifteenMinutes.seconds(), 900);
    }

    #[test]
    fn test_interval_rejects_unknown() {
        let err = "4h".parse::<Interval>().unwrap_err();
        assert!(matches!(err, PredictorError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_symbol_normalizes_case() {
        let allowed = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
        assert_eq!(parse_symbol(" btcusdt ", &allowed).unwrap(), "BTCUSDT");
        assert!(parse_symbol("DOGEUSDT", &allowed).is_err());
    }

    #[test]
    fn test_symbol_display_name() {
        assert_eq!(symbol_display_name("SOLUSDT"), Some("Solana"));
        assert_eq!(symbol_display_name("XRPUSDT"), None);
    }

    #[test]
    fn test_prediction_probabilities_sum_to_one() {
        for p in [0.0, 0.1, 0.3333333333, 0.5, 0.77, 1.0] {
            let pred = Prediction::from_prob_up("BTCUSDT", p);
            assert!((pred.prob_up + pred.prob_down - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_prediction_tie_goes_up() {
        assert_eq!(Prediction::from_prob_up("BTCUSDT", 0.5).label, Direction::Up);
        assert_eq!(
            Prediction::from_prob_up("BTCUSDT", 0.4999).label,
            Direction::Down
        );
    }

    #[test]
    fn test_prediction_clamps_out_of_range() {
        let pred = Prediction::from_prob_up("BTCUSDT", 1.7);
        assert_eq!(pred.prob_up, 1.0);
        assert_eq!(pred.prob_down, 0.0);
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(SentimentLabel::from_polarity(0.11), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.2), SentimentLabel::Negative);
    }

    #[test]
    fn test_log_record_join() {
        let pred = Prediction::from_prob_up("ETHUSDT", 0.62);
        let sentiment = SentimentResult {
            polarity: -0.4,
            label: SentimentLabel::Negative,
        };
        let record = LogRecord::join(Utc::now(), 3150.5, &pred, &sentiment, "eth looks weak");
        assert_eq!(record.symbol, "ETHUSDT");
        assert_eq!(record.pred_label, Direction::Up);
        assert_eq!(record.sentiment_label, SentimentLabel::Negative);
        assert_eq!(record.text, "eth looks weak");
    }

    #[test]
    fn test_market_snapshot_pct_change() {
        let candles = vec![candle(0, 100.0), candle(1, 200.0), candle(2, 210.0)];
        let snapshot = MarketSnapshot::from_candles(&candles).unwrap();
        assert_eq!(snapshot.latest_close, 210.0);
        assert_eq!(snapshot.previous_close, 200.0);
        assert!((snapshot.pct_change - 5.0).abs() < 1e-9);
        assert_eq!(snapshot.last_open_time, candles[2].open_time);
    }

    #[test]
    fn test_market_snapshot_needs_two_candles() {
        let err = MarketSnapshot::from_candles(&[candle(0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            PredictorError::InsufficientData { required: 2, available: 1 }
        ));
    }
}
