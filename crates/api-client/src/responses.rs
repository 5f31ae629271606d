//! Wire shapes of the provider payloads and their conversion into validated
//! domain snapshots.
//!
//! Field names follow the provider's JSON exactly; everything is checked
//! once here so the analytics layer never sees a malformed record.

use crate::error::ApiError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::{
    CostRecord, ErrorEvent, HistoryPoint, NewsItem, PricePoint, PriceSeries, Recommendation,
    RecommendationSnapshot, TechnicalIndicators, TelemetryCounter, TelemetrySnapshot,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Dimension name of the overall request counter.
pub const ALL_ENDPOINTS: &str = "all";

// --- Recommendations ---

#[derive(Debug, Clone, Deserialize)]
pub struct RawPricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawIndicators {
    pub rsi: Decimal,
    pub macd: Decimal,
    #[serde(default)]
    pub macd_signal: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNewsItem {
    pub title: String,
    pub source: String,
    pub date: NaiveDate,
    pub sentiment: Decimal,
}

/// One record of `GET /recommendations` or `GET /recommendations/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecommendation {
    pub symbol: String,
    pub current_price: Decimal,
    pub sentiment_summary: String,
    pub recommendation: String,
    pub company_name: String,
    pub sector: String,
    pub score: Decimal,
    #[serde(default)]
    pub sentiment_score: Option<Decimal>,
    #[serde(default)]
    pub technical_summary: Option<String>,
    #[serde(default)]
    pub price_history: Vec<RawPricePoint>,
    #[serde(default)]
    pub indicators: Option<RawIndicators>,
    #[serde(default)]
    pub news: Vec<RawNewsItem>,
}

impl RawRecommendation {
    pub fn into_domain(self) -> Result<Recommendation, ApiError> {
        if self.symbol.trim().is_empty() {
            return Err(ApiError::InvalidData("recommendation without a symbol".to_string()));
        }
        if self.current_price < Decimal::ZERO {
            return Err(ApiError::InvalidData(format!(
                "{}: negative current price {}",
                self.symbol, self.current_price
            )));
        }

        // The provider lists history in no guaranteed order; only duplicates are fatal.
        let mut points: Vec<PricePoint> = self
            .price_history
            .into_iter()
            .map(|p| PricePoint {
                timestamp: p.date,
                price: p.price,
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        let price_history = PriceSeries::new(points)
            .map_err(|e| ApiError::InvalidData(format!("{}: {}", self.symbol, e)))?;

        Ok(Recommendation {
            symbol: self.symbol,
            company_name: self.company_name,
            sector: self.sector,
            current_price: self.current_price,
            score: self.score,
            recommendation: self.recommendation,
            sentiment_summary: self.sentiment_summary,
            sentiment_score: self.sentiment_score,
            technical_summary: self.technical_summary,
            price_history,
            indicators: self.indicators.map(|i| TechnicalIndicators {
                rsi: i.rsi,
                macd: i.macd,
                macd_signal: i.macd_signal,
            }),
            news: self
                .news
                .into_iter()
                .map(|n| NewsItem {
                    title: n.title,
                    source: n.source,
                    date: n.date,
                    sentiment: n.sentiment,
                })
                .collect(),
        })
    }
}

/// Parses the symbol-keyed recommendations object, keeping the provider's key order.
pub fn parse_recommendations(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<RecommendationSnapshot, ApiError> {
    let object: Map<String, Value> = serde_json::from_str(body)?;
    let mut records = Vec::with_capacity(object.len());

    for (key, value) in object {
        let raw: RawRecommendation = serde_json::from_value(value)
            .map_err(|e| ApiError::Deserialization(format!("record '{}': {}", key, e)))?;
        if !raw.symbol.eq_ignore_ascii_case(&key) {
            return Err(ApiError::InvalidData(format!(
                "record keyed '{}' carries symbol '{}'",
                key, raw.symbol
            )));
        }
        records.push(raw.into_domain()?);
    }

    Ok(RecommendationSnapshot {
        fetched_at,
        records,
    })
}

pub fn parse_recommendation(body: &str) -> Result<Recommendation, ApiError> {
    let raw: RawRecommendation = serde_json::from_str(body)?;
    raw.into_domain()
}

// --- Telemetry ---

#[derive(Debug, Clone, Deserialize)]
pub struct RawEndpointCounter {
    pub endpoint: String,
    pub count: u64,
    pub success: u64,
    pub error: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCallsPoint {
    pub date: NaiveDate,
    pub calls: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawApiCalls {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    #[serde(default)]
    pub by_endpoint: Vec<RawEndpointCounter>,
    #[serde(default)]
    pub history: Vec<RawCallsPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModelUsage {
    pub model: String,
    pub tokens: u64,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTokensPoint {
    pub date: NaiveDate,
    pub tokens: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTokenUsage {
    #[serde(default)]
    pub by_model: Vec<RawModelUsage>,
    #[serde(default)]
    pub history: Vec<RawTokensPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTimePoint {
    pub date: NaiveDate,
    pub time: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerformance {
    #[serde(default)]
    pub samples_ms: Vec<Decimal>,
    #[serde(default)]
    pub history: Vec<RawTimePoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawErrorEvent {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub endpoint: String,
    pub error: String,
    pub status: u16,
}

/// The full `GET /telemetry` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTelemetry {
    pub api_calls: RawApiCalls,
    #[serde(default)]
    pub token_usage: RawTokenUsage,
    #[serde(default)]
    pub performance: RawPerformance,
    #[serde(default)]
    pub errors: Vec<RawErrorEvent>,
}

impl RawTelemetry {
    pub fn into_domain(self, fetched_at: DateTime<Utc>) -> Result<TelemetrySnapshot, ApiError> {
        let calls = self.api_calls;
        let api_calls =
            TelemetryCounter::new(ALL_ENDPOINTS, calls.total, calls.successful, calls.failed)?;

        let by_endpoint = calls
            .by_endpoint
            .into_iter()
            .map(|e| TelemetryCounter::new(e.endpoint, e.count, e.success, e.error))
            .collect::<Result<Vec<_>, _>>()?;

        let token_usage = self
            .token_usage
            .by_model
            .into_iter()
            .map(|m| {
                if m.unit_cost < Decimal::ZERO {
                    return Err(ApiError::InvalidData(format!(
                        "model '{}' has negative unit cost {}",
                        m.model, m.unit_cost
                    )));
                }
                Ok(CostRecord {
                    dimension: m.model,
                    usage_units: m.tokens,
                    unit_cost: m.unit_cost,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(TelemetrySnapshot {
            fetched_at,
            api_calls,
            by_endpoint,
            call_history: calls
                .history
                .into_iter()
                .map(|p| HistoryPoint {
                    date: p.date,
                    value: Decimal::from(p.calls),
                })
                .collect(),
            token_usage,
            token_history: self
                .token_usage
                .history
                .into_iter()
                .map(|p| HistoryPoint {
                    date: p.date,
                    value: Decimal::from(p.tokens),
                })
                .collect(),
            latency_samples: self.performance.samples_ms,
            latency_history: self
                .performance
                .history
                .into_iter()
                .map(|p| HistoryPoint {
                    date: p.date,
                    value: p.time,
                })
                .collect(),
            errors: self
                .errors
                .into_iter()
                .map(|e| ErrorEvent {
                    id: e.id,
                    timestamp: e.timestamp,
                    endpoint: e.endpoint,
                    message: e.error,
                    status: e.status,
                })
                .collect(),
        })
    }
}

pub fn parse_telemetry(body: &str, fetched_at: DateTime<Utc>) -> Result<TelemetrySnapshot, ApiError> {
    let raw: RawTelemetry = serde_json::from_str(body)?;
    raw.into_domain(fetched_at)
}
