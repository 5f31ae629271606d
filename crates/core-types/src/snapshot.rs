use crate::error::CoreError;
use crate::structs::{CostRecord, ErrorEvent, HistoryPoint, PriceSeries, TelemetryCounter};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Externally computed indicator readings for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    /// Bounded oscillator (RSI), expected in `[0, 100]`.
    pub rsi: Decimal,
    /// Signed momentum (MACD line).
    pub macd: Decimal,
    pub macd_signal: Option<Decimal>,
}

/// A news article with its provider-assigned sentiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub date: NaiveDate,
    pub sentiment: Decimal,
}

/// One validated recommendation record as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub current_price: Decimal,
    /// Opaque provider score. Never recomputed locally.
    pub score: Decimal,
    /// Provider label, kept verbatim.
    pub recommendation: String,
    pub sentiment_summary: String,
    pub sentiment_score: Option<Decimal>,
    pub technical_summary: Option<String>,
    pub price_history: PriceSeries,
    pub indicators: Option<TechnicalIndicators>,
    pub news: Vec<NewsItem>,
}

/// Longest ticker accepted from a caller.
pub const MAX_SYMBOL_LEN: usize = 12;

/// Normalizes a caller-supplied ticker to upper case and checks its charset.
///
/// Accepted symbols start with a letter or digit and contain only ASCII
/// letters, digits, `.` and `-` (e.g. "BRK.B", "RDS-A").
pub fn normalize_symbol(raw: &str) -> Result<String, CoreError> {
    let symbol = raw.trim().to_ascii_uppercase();
    let invalid = |reason: &str| {
        Err(CoreError::InvalidInput(
            "symbol".to_string(),
            format!("'{}' {}", raw.trim(), reason),
        ))
    };

    if symbol.is_empty() {
        return invalid("is empty");
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return invalid("is too long");
    }
    if !symbol.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return invalid("must start with a letter or digit");
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return invalid("contains characters outside [A-Z0-9.-]");
    }
    Ok(symbol)
}

/// All recommendations of one fetch, in the provider's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<Recommendation>,
}

impl RecommendationSnapshot {
    pub fn find(&self, symbol: &str) -> Option<&Recommendation> {
        self.records
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// One complete telemetry fetch. There is no delta protocol: every refresh
/// replaces the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub fetched_at: DateTime<Utc>,
    /// Overall request counter across every endpoint.
    pub api_calls: TelemetryCounter,
    pub by_endpoint: Vec<TelemetryCounter>,
    pub call_history: Vec<HistoryPoint>,
    pub token_usage: Vec<CostRecord>,
    pub token_history: Vec<HistoryPoint>,
    /// Response times in milliseconds.
    pub latency_samples: Vec<Decimal>,
    pub latency_history: Vec<HistoryPoint>,
    pub errors: Vec<ErrorEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_trimmed_and_upper_cased() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("rds-a").unwrap(), "RDS-A");
    }

    #[test]
    fn path_and_query_characters_are_rejected() {
        for raw in ["../../admin", "..", "AAPL?x=1", "A/B", "AAPL#top", "A%2F", "", "   "] {
            assert!(normalize_symbol(raw).is_err(), "accepted {:?}", raw);
        }
        assert!(normalize_symbol("ABCDEFGHIJKLM").is_err());
    }
}
