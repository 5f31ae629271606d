use crate::enums::{MomentumDirection, OscillatorZone, PricePosition};
use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single closing price on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDate,
    pub price: Decimal,
}

/// A chronological price series.
///
/// Construction validates the ordering (strictly increasing timestamps, so no
/// duplicates) and that every price is non-negative. The series cannot be
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        if let Some(point) = points.iter().find(|p| p.price < Decimal::ZERO) {
            return Err(CoreError::InvalidInput(
                "price_history".to_string(),
                format!("negative price {} on {}", point.price, point.timestamp),
            ));
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(CoreError::InvalidInput(
                "price_history".to_string(),
                format!(
                    "timestamps must be strictly increasing ({} followed by {})",
                    pair[0].timestamp, pair[1].timestamp
                ),
            ));
        }
        Ok(Self(points))
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        PriceSeries::new(points).map_err(serde::de::Error::custom)
    }
}

/// One output point of a moving average. `value` is `None` until the window
/// has filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub timestamp: NaiveDate,
    pub value: Option<Decimal>,
}

/// The latest value of one moving average and where the current price sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageReading {
    pub average: Decimal,
    pub position: PricePosition,
}

/// The true minimum and maximum of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Widens the range symmetrically by `fraction` for chart axes.
    /// The result is only meant for display.
    pub fn padded(&self, fraction: Decimal) -> DisplayRange {
        DisplayRange {
            lower: self.min * (Decimal::ONE - fraction),
            upper: self.max * (Decimal::ONE + fraction),
        }
    }
}

/// A padded axis range. Deliberately a different type from `PriceRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub lower: Decimal,
    pub upper: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Decimal,
    pub resistance: Decimal,
}

/// A classified momentum reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumIndicator {
    pub oscillator_value: Decimal,
    pub signed_momentum: Decimal,
    pub zone: OscillatorZone,
    pub direction: MomentumDirection,
}

/// A sentiment score guaranteed to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct SentimentScore(Decimal);

impl SentimentScore {
    pub fn new(value: Decimal) -> Result<Self, CoreError> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(CoreError::InvalidInput(
                "sentiment_score".to_string(),
                format!("{} is outside [0, 1]", value),
            ));
        }
        Ok(Self(value))
    }

    /// Clamps `value` into `[0, 1]`. The flag is `true` when clamping changed it.
    pub fn clamped(value: Decimal) -> (Self, bool) {
        let clamped = value.clamp(Decimal::ZERO, Decimal::ONE);
        (Self(clamped), clamped != value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for SentimentScore {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SentimentScore> for Decimal {
    fn from(score: SentimentScore) -> Self {
        score.0
    }
}

/// Request counters for one dimension (an endpoint or a model).
///
/// `successful + failed` may be smaller than `total`; the remainder is
/// requests still in flight or not yet classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounter {
    pub dimension: String,
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

impl TelemetryCounter {
    pub fn new(
        dimension: impl Into<String>,
        total: u64,
        successful: u64,
        failed: u64,
    ) -> Result<Self, CoreError> {
        let counter = Self {
            dimension: dimension.into(),
            total,
            successful,
            failed,
        };
        counter.validate()?;
        Ok(counter)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let classified = self.successful.checked_add(self.failed);
        match classified {
            Some(classified) if classified <= self.total => Ok(()),
            _ => Err(CoreError::InvalidInput(
                format!("counter '{}'", self.dimension),
                format!(
                    "successful ({}) + failed ({}) exceeds total ({})",
                    self.successful, self.failed, self.total
                ),
            )),
        }
    }

    /// Requests that are neither successful nor failed.
    pub fn unclassified(&self) -> u64 {
        self.total.saturating_sub(self.successful + self.failed)
    }
}

/// Usage of a billable dimension (e.g. tokens consumed by a model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    pub dimension: String,
    pub usage_units: u64,
    pub unit_cost: Decimal,
}

/// A dated value of a telemetry history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// A failed request recorded by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub endpoint: String,
    pub message: String,
    pub status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 9, d).unwrap()
    }

    #[test]
    fn price_series_rejects_duplicate_timestamps() {
        let points = vec![
            PricePoint { timestamp: day(1), price: dec!(10) },
            PricePoint { timestamp: day(1), price: dec!(11) },
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn price_series_rejects_out_of_order_points() {
        let points = vec![
            PricePoint { timestamp: day(2), price: dec!(10) },
            PricePoint { timestamp: day(1), price: dec!(11) },
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn price_series_rejects_negative_prices() {
        let points = vec![PricePoint { timestamp: day(1), price: dec!(-0.01) }];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn price_series_deserialization_validates() {
        let json = r#"[{"timestamp":"2023-09-02","price":"1"},{"timestamp":"2023-09-01","price":"2"}]"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
    }

    #[test]
    fn sentiment_score_bounds() {
        assert!(SentimentScore::new(dec!(0)).is_ok());
        assert!(SentimentScore::new(dec!(1)).is_ok());
        assert!(SentimentScore::new(dec!(1.01)).is_err());
        assert!(SentimentScore::new(dec!(-0.1)).is_err());
    }

    #[test]
    fn sentiment_score_clamp_reports_change() {
        let (score, clamped) = SentimentScore::clamped(dec!(1.2));
        assert_eq!(score.value(), dec!(1));
        assert!(clamped);

        let (score, clamped) = SentimentScore::clamped(dec!(0.5));
        assert_eq!(score.value(), dec!(0.5));
        assert!(!clamped);
    }

    #[test]
    fn counter_tolerates_unclassified_remainder() {
        let counter = TelemetryCounter::new("/get-stocks", 10, 7, 2).unwrap();
        assert_eq!(counter.unclassified(), 1);
    }

    #[test]
    fn counter_rejects_overcounting() {
        assert!(TelemetryCounter::new("/get-stocks", 10, 8, 3).is_err());
    }

    #[test]
    fn padded_range_widens_both_sides() {
        let range = PriceRange { min: dec!(100), max: dec!(200) };
        let display = range.padded(dec!(0.005));
        assert_eq!(display.lower, dec!(99.5));
        assert_eq!(display.upper, dec!(201));
    }
}
