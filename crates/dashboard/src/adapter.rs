//! Turns validated snapshots into flat, serializable view records.
//!
//! Everything here is a pure function of its inputs: the same snapshot always
//! yields the same records, and nothing is cached between calls.

use analytics::classification::{
    classify_recommendation, classify_sentiment, sentiment_from_summary,
};
use analytics::telemetry::{DimensionCost, DimensionRates, LatencySummary, Rates};
use analytics::{AnalyticsEngine, AnalyticsError, EngineSettings, TelemetryReport};
use chrono::{DateTime, NaiveDate, Utc};
use configuration::Config;
use core_types::{
    DisplayRange, ErrorEvent, HistoryPoint, MomentumIndicator, MovingAveragePoint,
    MovingAverageReading, Outlook, PricePoint, PricePosition, Recommendation,
    RecommendationSnapshot, RecommendationTier, SentimentScore, SentimentThresholds,
    SentimentTier, Severity, SupportResistance,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the adapter needs to know about thresholds and metric parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterSettings {
    pub thresholds: SentimentThresholds,
    pub engine: EngineSettings,
}

impl AdapterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: config.classification,
            engine: EngineSettings {
                moving_average_window: config.analysis.moving_average_window,
                moving_average_windows: config.analysis.moving_average_windows.clone(),
                display_padding: config.analysis.display_padding,
                spread_fraction: config.analysis.spread_fraction,
                bands: config.oscillator,
                recent_error_limit: config.analysis.recent_error_limit,
            },
        }
    }
}

/// Whether a sentiment tier came from the provider's score or from the summary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentSource {
    Numeric,
    /// Keyword heuristic over the summary. Coarse: text without a known
    /// keyword classifies as negative.
    KeywordFallback,
}

/// One row of the recommendations table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockViewRecord {
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub price: Decimal,
    pub score: Decimal,
    /// Provider label, displayed verbatim.
    pub recommendation: String,
    /// `None` when the label is not one of the known tiers.
    pub recommendation_tier: Option<RecommendationTier>,
    pub recommendation_severity: Severity,
    pub sentiment_score: Decimal,
    pub sentiment_tier: SentimentTier,
    pub sentiment_severity: Severity,
    pub sentiment_source: SentimentSource,
    pub sentiment_summary: String,
}

/// Builds one table row. A provider score outside `[0, 1]` is reported
/// clamped, so the score always agrees with its tier.
pub fn to_view_model(record: &Recommendation, settings: &AdapterSettings) -> StockViewRecord {
    let (raw_score, sentiment_source) = match record.sentiment_score {
        Some(score) => (score, SentimentSource::Numeric),
        None => (
            sentiment_from_summary(&record.sentiment_summary).value(),
            SentimentSource::KeywordFallback,
        ),
    };
    let sentiment_tier = classify_sentiment(raw_score, &settings.thresholds);
    let sentiment_score = SentimentScore::clamped(raw_score).0.value();

    let recommendation_tier = match classify_recommendation(&record.recommendation) {
        Ok(tier) => Some(tier),
        Err(e) => {
            tracing::warn!(symbol = %record.symbol, error = %e, "Unrecognised recommendation label.");
            None
        }
    };

    StockViewRecord {
        symbol: record.symbol.clone(),
        company_name: record.company_name.clone(),
        sector: record.sector.clone(),
        price: record.current_price,
        score: record.score,
        recommendation: record.recommendation.clone(),
        recommendation_tier,
        recommendation_severity: recommendation_tier
            .map(|t| t.severity())
            .unwrap_or(Severity::Adverse),
        sentiment_score,
        sentiment_tier,
        sentiment_severity: sentiment_tier.severity(),
        sentiment_source,
        sentiment_summary: record.sentiment_summary.clone(),
    }
}

// --- Dashboard (recommendations list) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorOutlook {
    pub sector: String,
    pub buy: usize,
    pub hold: usize,
    pub sell: usize,
    pub outlook: Outlook,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// When the provider last produced this list ("last analysis").
    pub fetched_at: DateTime<Utc>,
    /// The active sector filter, if any.
    pub sector: Option<String>,
    /// Every sector of the snapshot in first-seen order, for the filter control.
    pub sectors: Vec<String>,
    pub records: Vec<StockViewRecord>,
    pub outlooks: Vec<SectorOutlook>,
}

/// Builds the recommendations view, keeping the provider's order.
///
/// `sector` filters records by exact (case-insensitive) sector name. The
/// sector list and outlooks always cover the whole snapshot.
pub fn to_dashboard_view(
    snapshot: &RecommendationSnapshot,
    sector: Option<&str>,
    settings: &AdapterSettings,
) -> DashboardView {
    let all: Vec<StockViewRecord> = snapshot
        .records
        .iter()
        .map(|r| to_view_model(r, settings))
        .collect();

    let mut outlooks: Vec<SectorOutlook> = Vec::new();
    for record in &all {
        let index = match outlooks.iter().position(|o| o.sector == record.sector) {
            Some(index) => index,
            None => {
                outlooks.push(SectorOutlook {
                    sector: record.sector.clone(),
                    buy: 0,
                    hold: 0,
                    sell: 0,
                    outlook: Outlook::Neutral,
                    severity: Severity::Caution,
                });
                outlooks.len() - 1
            }
        };
        let entry = &mut outlooks[index];
        match record.recommendation_tier {
            Some(RecommendationTier::Buy) => entry.buy += 1,
            Some(RecommendationTier::Hold) => entry.hold += 1,
            Some(RecommendationTier::Sell) => entry.sell += 1,
            None => {}
        }
    }
    for entry in &mut outlooks {
        entry.outlook = match entry.buy.cmp(&entry.sell) {
            std::cmp::Ordering::Greater => Outlook::Bullish,
            std::cmp::Ordering::Less => Outlook::Bearish,
            std::cmp::Ordering::Equal => Outlook::Neutral,
        };
        entry.severity = entry.outlook.severity();
    }

    let sector = sector
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let records = match &sector {
        Some(wanted) => all
            .into_iter()
            .filter(|r| r.sector.eq_ignore_ascii_case(wanted))
            .collect(),
        None => all,
    };

    DashboardView {
        fetched_at: snapshot.fetched_at,
        sector,
        sectors: outlooks.iter().map(|o| o.sector.clone()).collect(),
        records,
        outlooks,
    }
}

// --- Stock detail ---

/// A widget that is either renderable or carries the reason it is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data")]
pub enum Widget<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Widget<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Widget::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Widget::Available(value) => Some(value),
            Widget::Unavailable { .. } => None,
        }
    }
}

impl<T> From<Result<T, AnalyticsError>> for Widget<T> {
    fn from(result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(value) => Widget::Available(value),
            Err(e) => Widget::unavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub points: Vec<PricePoint>,
    pub moving_average_window: usize,
    pub moving_average: Vec<MovingAveragePoint>,
    pub display_range: DisplayRange,
    /// Horizontal reference line at the last price of the series.
    pub reference_price: Option<Decimal>,
}

/// Latest trend average of one window and the current price's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub average: Decimal,
    pub position: PricePosition,
    pub severity: Severity,
}

impl From<MovingAverageReading> for TrendReading {
    fn from(reading: MovingAverageReading) -> Self {
        Self {
            average: reading.average,
            position: reading.position,
            severity: reading.position.severity(),
        }
    }
}

/// One moving-average badge, e.g. "50-Day MA ... Above".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageView {
    pub window: usize,
    pub reading: Widget<TrendReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsView {
    pub title: String,
    pub source: String,
    pub date: NaiveDate,
    pub sentiment: Decimal,
    pub tier: SentimentTier,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetailView {
    pub record: StockViewRecord,
    pub technical_summary: Option<String>,
    pub chart: Widget<ChartView>,
    pub momentum: Widget<MomentumIndicator>,
    pub moving_averages: Vec<MovingAverageView>,
    pub levels: Widget<SupportResistance>,
    pub interpretation: Widget<String>,
    pub news: Vec<NewsView>,
}

pub fn to_stock_detail(record: &Recommendation, settings: &AdapterSettings) -> StockDetailView {
    let engine = AnalyticsEngine::new(settings.engine.clone());
    let report = engine.technical(
        &record.price_history,
        record.current_price,
        record.indicators.as_ref(),
    );

    let chart = match (report.moving_average, report.display_range) {
        (Ok(moving_average), Ok(display_range)) => Widget::Available(ChartView {
            points: record.price_history.points().to_vec(),
            moving_average_window: settings.engine.moving_average_window,
            moving_average,
            display_range,
            reference_price: report.last_close,
        }),
        (Err(e), _) | (_, Err(e)) => Widget::unavailable(e.to_string()),
    };

    let momentum = match report.momentum {
        Some(result) => Widget::from(result),
        None => Widget::unavailable("no indicator readings"),
    };
    let interpretation = match report.interpretation {
        Some(reading) => Widget::Available(reading.summary()),
        None => Widget::unavailable("no indicator readings"),
    };

    let moving_averages = report
        .trend
        .into_iter()
        .map(|(window, reading)| MovingAverageView {
            window,
            reading: Widget::from(reading.map(TrendReading::from)),
        })
        .collect();

    let news = record
        .news
        .iter()
        .map(|item| {
            let tier = classify_sentiment(item.sentiment, &settings.thresholds);
            NewsView {
                title: item.title.clone(),
                source: item.source.clone(),
                date: item.date,
                sentiment: SentimentScore::clamped(item.sentiment).0.value(),
                tier,
                severity: tier.severity(),
            }
        })
        .collect();

    StockDetailView {
        record: to_view_model(record, settings),
        technical_summary: record.technical_summary.clone(),
        chart,
        momentum,
        moving_averages,
        levels: Widget::from(report.levels),
        interpretation,
        news,
    }
}

// --- Telemetry ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub dimension: String,
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub in_flight: u64,
    /// Percentages rounded to two places; `None` when `total` is zero.
    pub success_rate_pct: Option<Decimal>,
    pub error_rate_pct: Option<Decimal>,
}

impl From<DimensionRates> for RateRow {
    fn from(row: DimensionRates) -> Self {
        let (success_rate_pct, error_rate_pct) = percentages(&row.rates);
        Self {
            dimension: row.dimension,
            total: row.total,
            successful: row.successful,
            failed: row.failed,
            in_flight: row.in_flight,
            success_rate_pct,
            error_rate_pct,
        }
    }
}

fn percentages(rates: &Rates) -> (Option<Decimal>, Option<Decimal>) {
    let pct = |rate: Decimal| (rate * Decimal::ONE_HUNDRED).round_dp(2);
    (rates.success_rate.map(pct), rates.error_rate.map(pct))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryView {
    pub fetched_at: DateTime<Utc>,
    pub overall: Widget<RateRow>,
    pub endpoints: Widget<Vec<RateRow>>,
    pub call_history: Vec<HistoryPoint>,
    pub models: Widget<Vec<DimensionCost>>,
    pub total_tokens: Widget<u64>,
    pub total_cost: Widget<Decimal>,
    pub token_history: Vec<HistoryPoint>,
    pub latency: Widget<LatencySummary>,
    pub latency_history: Vec<HistoryPoint>,
    pub recent_errors: Vec<ErrorEvent>,
}

pub fn to_telemetry_view(report: TelemetryReport) -> TelemetryView {
    TelemetryView {
        fetched_at: report.fetched_at,
        overall: report.overall.map(RateRow::from).into(),
        endpoints: report
            .endpoints
            .map(|rows| rows.into_iter().map(RateRow::from).collect())
            .into(),
        call_history: report.call_history,
        models: report.models.into(),
        total_tokens: report.total_tokens.into(),
        total_cost: report.total_cost.into(),
        token_history: report.token_history,
        latency: report.latency.into(),
        latency_history: report.latency_history,
        recent_errors: report.recent_errors,
    }
}
