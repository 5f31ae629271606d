//! Rollups over request counters, latency samples and usage costs.

use crate::error::AnalyticsError;
use core_types::{CostRecord, ErrorEvent, HistoryPoint, TelemetryCounter};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Success and error rates as fractions in `[0, 1]`.
///
/// Both are `None` when the dimension saw no traffic: an idle endpoint has no
/// rate, which is different from a zero rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    pub success_rate: Option<Decimal>,
    pub error_rate: Option<Decimal>,
}

/// Rolled-up counters and rates for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRates {
    pub dimension: String,
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    /// Requests neither successful nor failed yet.
    pub in_flight: u64,
    pub rates: Rates,
}

/// Usage and cost summed for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCost {
    pub dimension: String,
    pub usage_units: u64,
    pub cost: Decimal,
}

/// Nearest-rank summary of a latency sample, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: Decimal,
    pub p50: Decimal,
    pub p95: Decimal,
    pub p99: Decimal,
    pub max: Decimal,
}

/// Rates of a single counter.
pub fn rates(counter: &TelemetryCounter) -> Result<Rates, AnalyticsError> {
    counter.validate()?;
    if counter.total == 0 {
        return Ok(Rates {
            success_rate: None,
            error_rate: None,
        });
    }

    let total = Decimal::from(counter.total);
    Ok(Rates {
        success_rate: Some(Decimal::from(counter.successful) / total),
        error_rate: Some(Decimal::from(counter.failed) / total),
    })
}

/// Groups counters by dimension and computes each dimension's rates.
///
/// Counters sharing a dimension are summed. Dimensions are returned in the
/// order they first appear.
pub fn aggregate_by_dimension(
    counters: &[TelemetryCounter],
) -> Result<Vec<DimensionRates>, AnalyticsError> {
    let mut merged: Vec<TelemetryCounter> = Vec::new();

    for counter in counters {
        counter.validate()?;
        match merged.iter_mut().find(|c| c.dimension == counter.dimension) {
            Some(existing) => {
                existing.total = existing.total.saturating_add(counter.total);
                existing.successful = existing.successful.saturating_add(counter.successful);
                existing.failed = existing.failed.saturating_add(counter.failed);
            }
            None => merged.push(counter.clone()),
        }
    }

    merged
        .into_iter()
        .map(|counter| {
            let rates = rates(&counter)?;
            Ok(DimensionRates {
                in_flight: counter.unclassified(),
                dimension: counter.dimension,
                total: counter.total,
                successful: counter.successful,
                failed: counter.failed,
                rates,
            })
        })
        .collect()
}

/// Nearest-rank percentile: the sample at rank `ceil(p / 100 * n)`.
///
/// `p` must lie strictly between 0 and 100. No interpolation happens between
/// samples, so the result is always one of the inputs.
pub fn percentile(samples: &[Decimal], p: Decimal) -> Result<Decimal, AnalyticsError> {
    let sorted = sorted_samples(samples, "percentile")?;
    nearest_rank(&sorted, p)
}

/// Mean, P50, P95, P99 and max of a latency sample.
pub fn latency_summary(samples: &[Decimal]) -> Result<LatencySummary, AnalyticsError> {
    let sorted = sorted_samples(samples, "latency_summary")?;
    let count = sorted.len();
    let sum: Decimal = sorted.iter().sum();

    Ok(LatencySummary {
        count,
        mean: sum / Decimal::from(count),
        p50: nearest_rank(&sorted, Decimal::from(50))?,
        p95: nearest_rank(&sorted, Decimal::from(95))?,
        p99: nearest_rank(&sorted, Decimal::from(99))?,
        max: sorted[count - 1],
    })
}

/// Total cost of all records. The cost of nothing is zero.
pub fn total_cost(records: &[CostRecord]) -> Result<Decimal, AnalyticsError> {
    records.iter().try_fold(Decimal::ZERO, |sum, record| {
        sum.checked_add(record_cost(record)?)
            .ok_or_else(|| overflow("total_cost", &record.dimension))
    })
}

/// Total usage units of all records.
pub fn total_usage(records: &[CostRecord]) -> Result<u64, AnalyticsError> {
    records.iter().try_fold(0u64, |sum, record| {
        sum.checked_add(record.usage_units)
            .ok_or_else(|| overflow("total_usage", &record.dimension))
    })
}

/// Usage and cost per dimension, in first-seen order.
pub fn cost_by_dimension(records: &[CostRecord]) -> Result<Vec<DimensionCost>, AnalyticsError> {
    let mut rows: Vec<DimensionCost> = Vec::new();
    for record in records {
        let cost = record_cost(record)?;
        match rows.iter_mut().find(|row| row.dimension == record.dimension) {
            Some(row) => {
                row.usage_units = row
                    .usage_units
                    .checked_add(record.usage_units)
                    .ok_or_else(|| overflow("cost_by_dimension", &record.dimension))?;
                row.cost = row
                    .cost
                    .checked_add(cost)
                    .ok_or_else(|| overflow("cost_by_dimension", &record.dimension))?;
            }
            None => rows.push(DimensionCost {
                dimension: record.dimension.clone(),
                usage_units: record.usage_units,
                cost,
            }),
        }
    }
    Ok(rows)
}

fn record_cost(record: &CostRecord) -> Result<Decimal, AnalyticsError> {
    Decimal::from(record.usage_units)
        .checked_mul(record.unit_cost)
        .ok_or_else(|| overflow("cost", &record.dimension))
}

fn overflow(operation: &str, dimension: &str) -> AnalyticsError {
    AnalyticsError::Overflow(format!("{} at dimension '{}'", operation, dimension))
}

/// Returns the history unchanged: same order, every point kept.
pub fn rollup_history(series: &[HistoryPoint]) -> Vec<HistoryPoint> {
    series.to_vec()
}

/// The `limit` most recent error events, newest first.
pub fn recent_errors(events: &[ErrorEvent], limit: usize) -> Vec<ErrorEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}

fn sorted_samples(samples: &[Decimal], operation: &str) -> Result<Vec<Decimal>, AnalyticsError> {
    if samples.is_empty() {
        return Err(AnalyticsError::EmptySeries(operation.to_string()));
    }
    if let Some(negative) = samples.iter().find(|s| **s < Decimal::ZERO) {
        return Err(AnalyticsError::InvalidArgument(format!(
            "latency samples must be non-negative, got {}",
            negative
        )));
    }
    let mut sorted = samples.to_vec();
    sorted.sort();
    Ok(sorted)
}

fn nearest_rank(sorted: &[Decimal], p: Decimal) -> Result<Decimal, AnalyticsError> {
    if p <= Decimal::ZERO || p >= Decimal::ONE_HUNDRED {
        return Err(AnalyticsError::InvalidArgument(format!(
            "percentile must be in (0, 100), got {}",
            p
        )));
    }

    let n = sorted.len();
    let rank = (p * Decimal::from(n) / Decimal::ONE_HUNDRED)
        .ceil()
        .to_usize()
        .unwrap_or(n);
    let index = rank.saturating_sub(1).min(n - 1);
    Ok(sorted[index])
}
