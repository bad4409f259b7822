//! Payload parsing tests for the market module

use super::*;
use crate::error::PredictorError;

fn kline(open_ms: i64, close: &str) -> String {
    format!(
        r#"[{}, "100.0", "101.5", "99.5", "{}", "12.25", {}, "1200.0", 42, "6.0", "600.0", "0"]"#,
        open_ms,
        close,
        open_ms + 59_999
    )
}

#[test]
fn test_parse_klines_decimal_strings() {
    let body = format!("[{},{}]", kline(1_700_000_000_000, "100.5"), kline(1_700_000_060_000, "101.25"));
    let candles = parse_klines(&body).unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open_time.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(candles[0].open, 100.0);
    assert_eq!(candles[0].high, 101.5);
    assert_eq!(candles[0].low, 99.5);
    assert_eq!(candles[0].close, 100.5);
    assert_eq!(candles[0].volume, 12.25);
    assert_eq!(candles[1].close, 101.25);
}

#[test]
fn test_parse_klines_accepts_plain_numbers() {
    let body = r#"[[1700000000000, 1.5, 2.0, 1.0, 1.75, 10, 1700000059999, 0, 1, 0, 0, 0]]"#;
    let candles = parse_klines(body).unwrap();
    assert_eq!(candles[0].close, 1.75);
    assert_eq!(candles[0].volume, 10.0);
}

#[test]
fn test_parse_klines_sorts_and_drops_duplicates() {
    let body = format!(
        "[{},{},{}]",
        kline(1_700_000_120_000, "3"),
        kline(1_700_000_000_000, "1"),
        kline(1_700_000_120_000, "3")
    );
    let candles = parse_klines(&body).unwrap();

    assert_eq!(candles.len(), 2);
    assert!(candles[0].open_time < candles[1].open_time);
    assert_eq!(candles[0].close, 1.0);
    assert_eq!(candles[1].close, 3.0);
}

#[test]
fn test_parse_klines_empty_array() {
    assert!(parse_klines("[]").unwrap().is_empty());
}

#[test]
fn test_parse_klines_rejects_error_object() {
    let err = parse_klines(r#"{"code": -1121, "msg": "Invalid symbol."}"#).unwrap_err();
    assert!(matches!(err, PredictorError::Upstream(_)));
    assert!(err.to_string().contains("expected array"));
}

#[test]
fn test_parse_klines_rejects_short_record() {
    let err = parse_klines(r#"[[1700000000000, "1", "2", "0.5", "1.5", "10"]]"#).unwrap_err();
    assert!(matches!(err, PredictorError::Upstream(_)));
}

#[test]
fn test_parse_klines_rejects_bad_decimal() {
    let body = format!("[{}]", kline(1_700_000_000_000, "abc"));
    let err = parse_klines(&body).unwrap_err();
    assert!(err.to_string().contains("close"));
}

#[test]
fn test_parse_klines_rejects_invalid_json() {
    assert!(matches!(
        parse_klines("not json"),
        Err(PredictorError::Upstream(_))
    ));
}

#[test]
fn test_parse_ticker_price() {
    let price = parse_ticker_price(r#"{"symbol":"BTCUSDT","price":"67123.45000000"}"#).unwrap();
    assert!((price - 67123.45).abs() < 1e-9);
}

#[test]
fn test_parse_ticker_price_rejects_bad_values() {
    assert!(parse_ticker_price(r#"{"symbol":"BTCUSDT","price":"n/a"}"#).is_err());
    assert!(parse_ticker_price(r#"{"symbol":"BTCUSDT","price":"0.0"}"#).is_err());
    assert!(parse_ticker_price(r#"{"symbol":"BTCUSDT"}"#).is_err());
}

mod http {
    use super::super::{BinanceClient, MarketDataSource};
    use crate::config::MarketConfig;
    use crate::error::PredictorError;
    use crate::types::Interval;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
    }

    /// Local server answering every request with `429 Too Many Requests`
    async fn rate_limited_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                read_request(&mut stream).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 429 Too Many Requests\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
                    )
                    .await;
                let _ = stream.shutdown().await;
            }
        });
        addr
    }

    /// Local server that accepts and never answers
    async fn silent_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    read_request(&mut stream).await;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    drop(stream);
                });
            }
        });
        addr
    }

    fn client(addr: SocketAddr) -> BinanceClient {
        BinanceClient::new(&MarketConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream() {
        let client = client(rate_limited_server().await);

        let err = client
            .get_candles("BTCUSDT", Interval::OneMinute, 100)
            .await
            .unwrap_err();
        match &err {
            PredictorError::Upstream(msg) => assert!(msg.contains("429"), "{}", msg),
            other => panic!("expected Upstream, got {:?}", other),
        }
        assert!(err.is_retryable());

        let err = client.get_latest_price("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, PredictorError::Upstream(ref msg) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let client = client(silent_server().await);

        let err = client
            .get_candles("ETHUSDT", Interval::FiveMinutes, 50)
            .await
            .unwrap_err();
        match &err {
            PredictorError::Upstream(msg) => assert!(msg.contains("timed out"), "{}", msg),
            other => panic!("expected Upstream, got {:?}", other),
        }

        let err = client.get_latest_price("ETHUSDT").await.unwrap_err();
        assert!(matches!(err, PredictorError::Upstream(_)));
    }
}
