use crate::report::{TechnicalReport, TelemetryReport};
use crate::series::{self, interpret};
use crate::telemetry::{self, DimensionRates};
use core_types::{OscillatorBands, PriceSeries, TechnicalIndicators, TelemetrySnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tunable parameters of the derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub moving_average_window: usize,
    /// Windows of the trend averages the current price is compared with.
    pub moving_average_windows: Vec<usize>,
    /// Symmetric padding applied to the chart's price axis (0.005 = 0.5%).
    pub display_padding: Decimal,
    /// Distance of support/resistance from the current price (0.05 = 5%).
    pub spread_fraction: Decimal,
    pub bands: OscillatorBands,
    pub recent_error_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            moving_average_window: 5,
            moving_average_windows: vec![50, 200],
            display_padding: dec!(0.005),
            spread_fraction: dec!(0.05),
            bands: OscillatorBands::default(),
            recent_error_limit: 5,
        }
    }
}

/// A stateless calculator for deriving display metrics from fetched snapshots.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsEngine {
    settings: EngineSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Derives every telemetry widget from one snapshot.
    pub fn telemetry(&self, snapshot: &TelemetrySnapshot) -> TelemetryReport {
        let overall = telemetry::rates(&snapshot.api_calls).map(|rates| DimensionRates {
            dimension: snapshot.api_calls.dimension.clone(),
            total: snapshot.api_calls.total,
            successful: snapshot.api_calls.successful,
            failed: snapshot.api_calls.failed,
            in_flight: snapshot.api_calls.unclassified(),
            rates,
        });

        let report = TelemetryReport {
            fetched_at: snapshot.fetched_at,
            overall,
            endpoints: telemetry::aggregate_by_dimension(&snapshot.by_endpoint),
            call_history: telemetry::rollup_history(&snapshot.call_history),
            models: telemetry::cost_by_dimension(&snapshot.token_usage),
            total_tokens: telemetry::total_usage(&snapshot.token_usage),
            total_cost: telemetry::total_cost(&snapshot.token_usage),
            token_history: telemetry::rollup_history(&snapshot.token_history),
            latency: telemetry::latency_summary(&snapshot.latency_samples),
            latency_history: telemetry::rollup_history(&snapshot.latency_history),
            recent_errors: telemetry::recent_errors(
                &snapshot.errors,
                self.settings.recent_error_limit,
            ),
        };

        if let Err(e) = &report.latency {
            tracing::debug!(error = %e, "Latency summary unavailable.");
        }
        if let Err(e) = &report.total_tokens {
            tracing::warn!(error = %e, "Token usage could not be totalled.");
        }
        if let Err(e) = &report.total_cost {
            tracing::warn!(error = %e, "Token cost could not be totalled.");
        }
        report
    }

    /// Derives the chart, levels and momentum widgets for one symbol.
    pub fn technical(
        &self,
        series: &PriceSeries,
        current_price: Decimal,
        indicators: Option<&TechnicalIndicators>,
    ) -> TechnicalReport {
        let range = series::price_range(series);
        let display_range = range
            .clone()
            .map(|r| r.padded(self.settings.display_padding));

        let momentum = indicators
            .map(|i| series::momentum(i.rsi, i.macd, &self.settings.bands));
        let interpretation = match (&momentum, indicators) {
            (Some(Ok(reading)), Some(i)) => {
                Some(interpret(reading, i.macd_signal, &self.settings.bands))
            }
            _ => None,
        };

        let trend = self
            .settings
            .moving_average_windows
            .iter()
            .map(|&window| (window, series::price_vs_average(series, window, current_price)))
            .collect();

        TechnicalReport {
            moving_average: series::moving_average(series, self.settings.moving_average_window),
            trend,
            range,
            display_range,
            last_close: series.last().map(|p| p.price),
            levels: series::support_resistance(current_price, self.settings.spread_fraction),
            momentum,
            interpretation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use crate::AnalyticsError;
    use core_types::{CostRecord, PricePoint, TelemetryCounter};

    fn empty_snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            fetched_at: Utc.with_ymd_and_hms(2023, 9, 19, 15, 0, 0).unwrap(),
            api_calls: TelemetryCounter::new("all", 0, 0, 0).unwrap(),
            by_endpoint: vec![],
            call_history: vec![],
            token_usage: vec![],
            token_history: vec![],
            latency_samples: vec![],
            latency_history: vec![],
            errors: vec![],
        }
    }

    #[test]
    fn one_failing_widget_does_not_blank_the_report() {
        let mut snapshot = empty_snapshot();
        snapshot.api_calls = TelemetryCounter::new("all", 10, 9, 1).unwrap();

        let report = AnalyticsEngine::default().telemetry(&snapshot);
        assert!(report.latency.is_err());
        assert_eq!(report.overall.unwrap().rates.error_rate, Some(dec!(0.1)));
        assert_eq!(report.total_cost, Ok(Decimal::ZERO));
        assert_eq!(report.total_tokens, Ok(0));
    }

    #[test]
    fn technical_report_uses_current_price_for_levels() {
        let start = NaiveDate::from_ymd_opt(2023, 8, 1).unwrap();
        let series = PriceSeries::new(vec![
            PricePoint { timestamp: start, price: dec!(90) },
            PricePoint { timestamp: start + chrono::Days::new(7), price: dec!(110) },
        ])
        .unwrap();

        let report = AnalyticsEngine::default().technical(&series, dec!(100), None);
        let levels = report.levels.unwrap();
        assert_eq!(levels.support, dec!(95));
        assert_eq!(report.last_close, Some(dec!(110)));
        assert!(report.momentum.is_none());
        assert!(report.interpretation.is_none());
        let display = report.display_range.unwrap();
        assert_eq!(display.lower, dec!(89.55));
        assert_eq!(display.upper, dec!(110.55));
    }

    #[test]
    fn trend_readings_follow_the_configured_windows() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = PriceSeries::new(
            (0..60u64)
                .map(|i| PricePoint {
                    timestamp: start + chrono::Days::new(i),
                    price: Decimal::from(100 + i),
                })
                .collect(),
        )
        .unwrap();

        let report = AnalyticsEngine::default().technical(&series, dec!(150), None);
        let windows: Vec<usize> = report.trend.iter().map(|(w, _)| *w).collect();
        assert_eq!(windows, vec![50, 200]);

        let fifty = report.trend[0].1.as_ref().unwrap();
        assert_eq!(fifty.average, dec!(134.5));
        assert_eq!(fifty.position, core_types::PricePosition::Above);
        assert!(matches!(
            report.trend[1].1,
            Err(AnalyticsError::InsufficientHistory { window: 200, available: 60 })
        ));
    }

    #[test]
    fn token_overflow_only_blanks_the_cost_widgets() {
        let mut snapshot = empty_snapshot();
        snapshot.api_calls = TelemetryCounter::new("all", 10, 9, 1).unwrap();
        let record = CostRecord {
            dimension: "gpt-4".to_string(),
            usage_units: u64::MAX / 2 + 1,
            unit_cost: dec!(0.00003),
        };
        snapshot.token_usage = vec![record.clone(), record];

        let report = AnalyticsEngine::default().telemetry(&snapshot);
        assert!(matches!(report.total_tokens, Err(AnalyticsError::Overflow(_))));
        assert!(report.models.is_err());
        assert!(report.total_cost.is_ok());
        assert!(report.overall.is_ok());
    }

    #[test]
    fn empty_series_degrades_to_unavailable_widgets() {
        let indicators = TechnicalIndicators {
            rsi: dec!(62),
            macd: dec!(1.45),
            macd_signal: None,
        };
        let report =
            AnalyticsEngine::default().technical(&PriceSeries::default(), dec!(182.52), Some(&indicators));
        assert!(report.range.is_err());
        assert!(report.display_range.is_err());
        assert!(report.moving_average.unwrap().is_empty());
        assert!(report.momentum.unwrap().is_ok());
        assert!(report.levels.is_ok());
    }
}
