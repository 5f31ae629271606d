use api_client::error::ApiError;
use api_client::{HttpProviderClient, ApiClient, parse_recommendation, parse_recommendations, parse_telemetry};
use chrono::{TimeZone, Utc};
use configuration::Provider;
use rust_decimal_macros::dec;
use std::time::Duration;

const RECOMMENDATIONS: &str = r#"{
    "MSFT": {
        "symbol": "MSFT",
        "company_name": "Microsoft Corporation",
        "sector": "Technology",
        "current_price": 328.79,
        "score": 0.72,
        "recommendation": "Buy",
        "sentiment_summary": "Positive outlook on cloud growth",
        "sentiment_score": 0.82
    },
    "AAPL": {
        "symbol": "AAPL",
        "company_name": "Apple Inc.",
        "sector": "Technology",
        "current_price": 182.52,
        "score": 0.55,
        "recommendation": "Hold",
        "sentiment_summary": "Neutral",
        "price_history": [
            {"date": "2023-09-02", "price": 176.32},
            {"date": "2023-09-01", "price": 165.23}
        ],
        "indicators": {"rsi": 62, "macd": 1.45, "macd_signal": 0.9},
        "news": [
            {"title": "Apple unveils new iPhone", "source": "Reuters", "date": "2023-09-12", "sentiment": 0.78}
        ]
    },
    "JNJ": {
        "symbol": "JNJ",
        "company_name": "Johnson & Johnson",
        "sector": "Healthcare",
        "current_price": 161.2,
        "score": 0.31,
        "recommendation": "Sell",
        "sentiment_summary": "Litigation concerns weigh on the stock"
    }
}"#;

const TELEMETRY: &str = r#"{
    "api_calls": {
        "total": 1254,
        "successful": 1203,
        "failed": 51,
        "by_endpoint": [
            {"endpoint": "/run-analysis", "count": 532, "success": 512, "error": 20},
            {"endpoint": "/get-stocks", "count": 423, "success": 410, "error": 13},
            {"endpoint": "/get-detail", "count": 299, "success": 281, "error": 18}
        ],
        "history": [{"date": "2023-09-18", "calls": 180}, {"date": "2023-09-19", "calls": 195}]
    },
    "token_usage": {
        "by_model": [
            {"model": "gpt-4", "tokens": 3245678, "unit_cost": 0.00003},
            {"model": "gpt-3.5-turbo", "tokens": 5296689, "unit_cost": 0.000002}
        ],
        "history": [{"date": "2023-09-19", "tokens": 132000}]
    },
    "performance": {
        "samples_ms": [210, 225, 218, 232, 245, 260, 245],
        "history": [{"date": "2023-09-19", "time": 245}]
    },
    "errors": [
        {"id": 1, "timestamp": "2023-09-19T14:32:45", "endpoint": "/run-analysis", "error": "Rate limit exceeded", "status": 429}
    ]
}"#;

fn fetched_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 9, 19, 15, 0, 0).unwrap()
}

#[test]
fn recommendations_keep_provider_order() {
    let snapshot = parse_recommendations(RECOMMENDATIONS, fetched_at()).unwrap();
    let symbols: Vec<_> = snapshot.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["MSFT", "AAPL", "JNJ"]);
    assert_eq!(snapshot.fetched_at, fetched_at());
}

#[test]
fn optional_fields_are_carried_through() {
    let snapshot = parse_recommendations(RECOMMENDATIONS, fetched_at()).unwrap();

    let msft = snapshot.find("msft").unwrap();
    assert_eq!(msft.sentiment_score, Some(dec!(0.82)));
    assert!(msft.price_history.is_empty());
    assert!(msft.indicators.is_none());

    let aapl = snapshot.find("AAPL").unwrap();
    assert_eq!(aapl.sentiment_score, None);
    assert_eq!(aapl.current_price, dec!(182.52));
    assert_eq!(aapl.indicators.unwrap().macd_signal, Some(dec!(0.9)));
    assert_eq!(aapl.news.len(), 1);
    // History arrives unsorted and is stored oldest first.
    let prices: Vec<_> = aapl.price_history.points().iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![dec!(165.23), dec!(176.32)]);
}

#[test]
fn missing_required_field_rejects_the_payload() {
    let body = r#"{"TSLA": {"symbol": "TSLA", "current_price": 250.1}}"#;
    assert!(matches!(
        parse_recommendations(body, fetched_at()),
        Err(ApiError::Deserialization(_))
    ));
}

#[test]
fn mismatched_key_is_invalid_data() {
    let body = r#"{"TSLA": {
        "symbol": "NVDA", "company_name": "NVIDIA", "sector": "Technology",
        "current_price": 450.0, "score": 0.9, "recommendation": "Buy",
        "sentiment_summary": "Positive"
    }}"#;
    assert!(matches!(
        parse_recommendations(body, fetched_at()),
        Err(ApiError::InvalidData(_))
    ));
}

#[test]
fn duplicate_history_dates_are_invalid_data() {
    let body = r#"{
        "symbol": "AAPL", "company_name": "Apple Inc.", "sector": "Technology",
        "current_price": 182.52, "score": 0.55, "recommendation": "Hold",
        "sentiment_summary": "Neutral",
        "price_history": [
            {"date": "2023-09-01", "price": 165.23},
            {"date": "2023-09-01", "price": 166.0}
        ]
    }"#;
    assert!(matches!(parse_recommendation(body), Err(ApiError::InvalidData(_))));
}

#[test]
fn telemetry_payload_maps_to_snapshot() {
    let snapshot = parse_telemetry(TELEMETRY, fetched_at()).unwrap();

    assert_eq!(snapshot.api_calls.total, 1254);
    assert_eq!(snapshot.api_calls.successful, 1203);
    assert_eq!(snapshot.by_endpoint.len(), 3);
    assert_eq!(snapshot.by_endpoint[0].dimension, "/run-analysis");
    assert_eq!(snapshot.token_usage[1].usage_units, 5296689);
    assert_eq!(snapshot.latency_samples.len(), 7);
    assert_eq!(snapshot.call_history[1].value, dec!(195));
    assert_eq!(snapshot.errors[0].message, "Rate limit exceeded");
    assert_eq!(snapshot.errors[0].status, 429);
}

#[test]
fn overcounted_telemetry_is_invalid_data() {
    let body = r#"{"api_calls": {"total": 10, "successful": 9, "failed": 5}}"#;
    assert!(matches!(
        parse_telemetry(body, fetched_at()),
        Err(ApiError::InvalidData(_))
    ));
}

#[test]
fn telemetry_sections_default_to_empty() {
    let body = r#"{"api_calls": {"total": 0, "successful": 0, "failed": 0}}"#;
    let snapshot = parse_telemetry(body, fetched_at()).unwrap();
    assert!(snapshot.token_usage.is_empty());
    assert!(snapshot.latency_samples.is_empty());
    assert!(snapshot.errors.is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let provider = Provider {
        base_url: "http://127.0.0.1:9/api/".to_string(),
        timeout: Duration::from_millis(500),
    };
    let client = HttpProviderClient::new(&provider).unwrap();
    assert_eq!(client.base_url(), "http://127.0.0.1:9/api");

    let result = client.fetch_telemetry().await;
    assert!(matches!(result, Err(ApiError::Transport(_))));
}
