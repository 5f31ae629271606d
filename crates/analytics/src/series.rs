//! Indicators derived from a single price series.

use crate::error::AnalyticsError;
use core_types::{
    MomentumDirection, MomentumIndicator, MovingAveragePoint, MovingAverageReading,
    OscillatorBands, OscillatorZone, PricePosition, PriceRange, PriceSeries, SupportResistance,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trailing simple moving average over `window` points.
///
/// The output has one point per input point. A point is `Some` only once
/// `window` prices are available; earlier points stay `None`.
/// Runs in O(n) by keeping a running sum of the current window.
pub fn moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<MovingAveragePoint>, AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidArgument(
            "moving average window must be greater than zero".to_string(),
        ));
    }

    let points = series.points();
    let divisor = Decimal::from(window);
    let mut running_sum = Decimal::ZERO;
    let mut result = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        running_sum += point.price;
        if i >= window {
            running_sum -= points[i - window].price;
        }

        let value = if i + 1 >= window {
            Some(running_sum / divisor)
        } else {
            None
        };
        result.push(MovingAveragePoint {
            timestamp: point.timestamp,
            value,
        });
    }

    Ok(result)
}

/// The newest `window`-point average and whether `current_price` is above it.
///
/// Fails while the series is still warming up, i.e. has fewer than `window`
/// prices.
pub fn price_vs_average(
    series: &PriceSeries,
    window: usize,
    current_price: Decimal,
) -> Result<MovingAverageReading, AnalyticsError> {
    let average = moving_average(series, window)?
        .last()
        .and_then(|point| point.value)
        .ok_or(AnalyticsError::InsufficientHistory {
            window,
            available: series.len(),
        })?;

    let position = if current_price > average {
        PricePosition::Above
    } else {
        PricePosition::Below
    };
    Ok(MovingAverageReading { average, position })
}

/// The true min and max of a series.
pub fn price_range(series: &PriceSeries) -> Result<PriceRange, AnalyticsError> {
    let mut prices = series.points().iter().map(|p| p.price);
    let first = prices
        .next()
        .ok_or_else(|| AnalyticsError::EmptySeries("price_range".to_string()))?;

    let (min, max) = prices.fold((first, first), |(min, max), price| {
        (min.min(price), max.max(price))
    });
    Ok(PriceRange { min, max })
}

/// Zones an externally computed oscillator reading and classifies the sign of
/// the accompanying momentum value.
pub fn momentum(
    oscillator_value: Decimal,
    signed_momentum: Decimal,
    bands: &OscillatorBands,
) -> Result<MomentumIndicator, AnalyticsError> {
    if oscillator_value < Decimal::ZERO || oscillator_value > Decimal::ONE_HUNDRED {
        return Err(AnalyticsError::InvalidArgument(format!(
            "oscillator value {} is outside [0, 100]",
            oscillator_value
        )));
    }

    let zone = if oscillator_value < bands.oversold {
        OscillatorZone::Oversold
    } else if oscillator_value > bands.overbought {
        OscillatorZone::Overbought
    } else {
        OscillatorZone::Neutral
    };

    let direction = if signed_momentum > Decimal::ZERO {
        MomentumDirection::Bullish
    } else if signed_momentum < Decimal::ZERO {
        MomentumDirection::Bearish
    } else {
        MomentumDirection::Flat
    };

    Ok(MomentumIndicator {
        oscillator_value,
        signed_momentum,
        zone,
        direction,
    })
}

/// Symmetric support and resistance levels around a reference price.
pub fn support_resistance(
    reference_price: Decimal,
    spread_fraction: Decimal,
) -> Result<SupportResistance, AnalyticsError> {
    if reference_price <= Decimal::ZERO {
        return Err(AnalyticsError::InvalidArgument(format!(
            "reference price must be positive, got {}",
            reference_price
        )));
    }
    if spread_fraction <= Decimal::ZERO || spread_fraction >= Decimal::ONE {
        return Err(AnalyticsError::InvalidArgument(format!(
            "spread fraction must be in (0, 1), got {}",
            spread_fraction
        )));
    }

    Ok(SupportResistance {
        support: reference_price * (Decimal::ONE - spread_fraction),
        resistance: reference_price * (Decimal::ONE + spread_fraction),
    })
}

/// A human-readable reading of the momentum indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalInterpretation {
    pub signals: Vec<String>,
}

impl TechnicalInterpretation {
    pub fn summary(&self) -> String {
        if self.signals.is_empty() {
            "Neutral technical indicators".to_string()
        } else {
            self.signals.join(" | ")
        }
    }
}

/// Describes the oscillator zone and, when a signal line is known, whether the
/// momentum line sits above or below it.
pub fn interpret(
    indicator: &MomentumIndicator,
    macd_signal: Option<Decimal>,
    bands: &OscillatorBands,
) -> TechnicalInterpretation {
    let mut signals = Vec::new();

    match indicator.zone {
        OscillatorZone::Overbought => signals.push(format!(
            "Overbought conditions (RSI > {})",
            bands.overbought.normalize()
        )),
        OscillatorZone::Oversold => signals.push(format!(
            "Oversold conditions (RSI < {})",
            bands.oversold.normalize()
        )),
        OscillatorZone::Neutral => {}
    }

    if let Some(signal) = macd_signal {
        if indicator.signed_momentum > signal {
            signals.push("Bullish MACD crossover".to_string());
        } else if indicator.signed_momentum < signal {
            signals.push("Bearish MACD crossover".to_string());
        }
    }

    TechnicalInterpretation { signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::PricePoint;
    use rust_decimal_macros::dec;

    fn series(prices: &[Decimal]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 8, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + chrono::Days::new(i as u64),
                price,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn moving_average_leaves_warm_up_absent() {
        let s = series(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        let ma = moving_average(&s, 3).unwrap();
        let values: Vec<_> = ma.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![None, None, Some(dec!(2)), Some(dec!(3)), Some(dec!(4))]);
    }

    #[test]
    fn moving_average_keeps_timestamps() {
        let s = series(&[dec!(1), dec!(2), dec!(3)]);
        let ma = moving_average(&s, 2).unwrap();
        for (point, avg) in s.points().iter().zip(&ma) {
            assert_eq!(point.timestamp, avg.timestamp);
        }
    }

    #[test]
    fn price_is_compared_with_the_newest_average() {
        let s = series(&[dec!(10), dec!(20), dec!(30), dec!(40)]);

        let above = price_vs_average(&s, 2, dec!(36)).unwrap();
        assert_eq!(above.average, dec!(35));
        assert_eq!(above.position, PricePosition::Above);

        let below = price_vs_average(&s, 4, dec!(20)).unwrap();
        assert_eq!(below.average, dec!(25));
        assert_eq!(below.position, PricePosition::Below);

        let level = price_vs_average(&s, 2, dec!(35)).unwrap();
        assert_eq!(level.position, PricePosition::Below);
    }

    #[test]
    fn price_vs_average_during_warm_up_is_unavailable() {
        let s = series(&[dec!(10), dec!(20), dec!(30)]);
        assert_eq!(
            price_vs_average(&s, 50, dec!(25)),
            Err(AnalyticsError::InsufficientHistory {
                window: 50,
                available: 3
            })
        );
        assert!(matches!(
            price_vs_average(&PriceSeries::default(), 1, dec!(25)),
            Err(AnalyticsError::InsufficientHistory { available: 0, .. })
        ));
        assert!(price_vs_average(&s, 0, dec!(25)).is_err());
    }

    #[test]
    fn moving_average_with_oversized_window_is_all_absent() {
        let s = series(&[dec!(1), dec!(2)]);
        let ma = moving_average(&s, 5).unwrap();
        assert_eq!(ma.len(), 2);
        assert!(ma.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn moving_average_rejects_zero_window() {
        let s = series(&[dec!(1)]);
        assert!(matches!(
            moving_average(&s, 0),
            Err(AnalyticsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn moving_average_of_empty_series_is_empty() {
        let ma = moving_average(&PriceSeries::default(), 3).unwrap();
        assert!(ma.is_empty());
    }

    #[test]
    fn price_range_finds_extremes() {
        let s = series(&[dec!(165.23), dec!(182.52), dec!(176.32), dec!(160.1)]);
        let range = price_range(&s).unwrap();
        assert_eq!(range.min, dec!(160.1));
        assert_eq!(range.max, dec!(182.52));
    }

    #[test]
    fn price_range_of_empty_series_fails() {
        assert!(matches!(
            price_range(&PriceSeries::default()),
            Err(AnalyticsError::EmptySeries(_))
        ));
    }

    #[test]
    fn momentum_zones_are_inclusive_on_the_neutral_side() {
        let bands = OscillatorBands::default();
        let zone = |v: Decimal| momentum(v, Decimal::ZERO, &bands).unwrap().zone;
        assert_eq!(zone(dec!(29.99)), OscillatorZone::Oversold);
        assert_eq!(zone(dec!(30)), OscillatorZone::Neutral);
        assert_eq!(zone(dec!(70)), OscillatorZone::Neutral);
        assert_eq!(zone(dec!(70.01)), OscillatorZone::Overbought);
    }

    #[test]
    fn momentum_direction_follows_sign() {
        let bands = OscillatorBands::default();
        let dir = |m: Decimal| momentum(dec!(50), m, &bands).unwrap().direction;
        assert_eq!(dir(dec!(1.45)), MomentumDirection::Bullish);
        assert_eq!(dir(dec!(-0.2)), MomentumDirection::Bearish);
        assert_eq!(dir(dec!(0)), MomentumDirection::Flat);
    }

    #[test]
    fn momentum_rejects_out_of_range_oscillator() {
        let bands = OscillatorBands::default();
        assert!(momentum(dec!(100.5), dec!(0), &bands).is_err());
        assert!(momentum(dec!(-1), dec!(0), &bands).is_err());
    }

    #[test]
    fn support_resistance_fixture() {
        let levels = support_resistance(dec!(100), dec!(0.05)).unwrap();
        assert_eq!(levels.support, dec!(95.0));
        assert_eq!(levels.resistance, dec!(105.0));
    }

    #[test]
    fn support_resistance_rejects_bad_arguments() {
        assert!(matches!(
            support_resistance(dec!(100), dec!(1.5)),
            Err(AnalyticsError::InvalidArgument(_))
        ));
        assert!(support_resistance(dec!(100), dec!(0)).is_err());
        assert!(support_resistance(dec!(100), dec!(1)).is_err());
        assert!(support_resistance(dec!(0), dec!(0.05)).is_err());
        assert!(support_resistance(dec!(-5), dec!(0.05)).is_err());
    }

    #[test]
    fn interpretation_reports_zone_and_crossover() {
        let bands = OscillatorBands::default();
        let hot = momentum(dec!(75), dec!(1.2), &bands).unwrap();
        let reading = interpret(&hot, Some(dec!(0.8)), &bands);
        assert_eq!(
            reading.summary(),
            "Overbought conditions (RSI > 70) | Bullish MACD crossover"
        );

        let calm = momentum(dec!(50), dec!(0.5), &bands).unwrap();
        assert_eq!(
            interpret(&calm, None, &bands).summary(),
            "Neutral technical indicators"
        );

        let cold = momentum(dec!(22), dec!(-0.4), &bands).unwrap();
        assert_eq!(
            interpret(&cold, Some(dec!(-0.1)), &bands).summary(),
            "Oversold conditions (RSI < 30) | Bearish MACD crossover"
        );
    }
}
