use crate::error::AnalyticsError;
use crate::series::TechnicalInterpretation;
use crate::telemetry::{DimensionCost, DimensionRates, LatencySummary};
use chrono::{DateTime, Utc};
use core_types::{
    DisplayRange, ErrorEvent, HistoryPoint, MomentumIndicator, MovingAveragePoint,
    MovingAverageReading, PriceRange, SupportResistance,
};
use rust_decimal::Decimal;

/// Everything derived from one telemetry snapshot.
///
/// Each widget is computed independently so a failure in one of them (an empty
/// latency sample, a malformed counter) leaves the others intact.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReport {
    pub fetched_at: DateTime<Utc>,

    // I. Request volume
    pub overall: Result<DimensionRates, AnalyticsError>,
    pub endpoints: Result<Vec<DimensionRates>, AnalyticsError>,
    pub call_history: Vec<HistoryPoint>,

    // II. Usage and cost
    pub models: Result<Vec<DimensionCost>, AnalyticsError>,
    pub total_tokens: Result<u64, AnalyticsError>,
    pub total_cost: Result<Decimal, AnalyticsError>,
    pub token_history: Vec<HistoryPoint>,

    // III. Performance
    pub latency: Result<LatencySummary, AnalyticsError>,
    pub latency_history: Vec<HistoryPoint>,

    // IV. Errors
    pub recent_errors: Vec<ErrorEvent>,
}

/// Everything derived from one symbol's price series and indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalReport {
    pub moving_average: Result<Vec<MovingAveragePoint>, AnalyticsError>,
    /// One reading per configured trend window, in configuration order.
    pub trend: Vec<(usize, Result<MovingAverageReading, AnalyticsError>)>,
    pub range: Result<PriceRange, AnalyticsError>,
    pub display_range: Result<DisplayRange, AnalyticsError>,
    /// Last price of the series, drawn as the chart's reference line.
    pub last_close: Option<Decimal>,
    pub levels: Result<SupportResistance, AnalyticsError>,
    /// `None` when the provider supplied no indicator readings.
    pub momentum: Option<Result<MomentumIndicator, AnalyticsError>>,
    pub interpretation: Option<TechnicalInterpretation>,
}
