use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Lower bounds of the sentiment tiers. Each tier is closed on its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub positive: Decimal,
    pub neutral: Decimal,
}

impl SentimentThresholds {
    pub fn validate(&self) -> Result<(), CoreError> {
        let in_unit = |v: Decimal| v > Decimal::ZERO && v <= Decimal::ONE;
        if !in_unit(self.neutral) || !in_unit(self.positive) || self.neutral >= self.positive {
            return Err(CoreError::InvalidInput(
                "sentiment thresholds".to_string(),
                format!(
                    "expected 0 < neutral ({}) < positive ({}) <= 1",
                    self.neutral, self.positive
                ),
            ));
        }
        Ok(())
    }
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: dec!(0.7),
            neutral: dec!(0.4),
        }
    }
}

/// Oscillator zone boundaries. Both bounds belong to the neutral zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscillatorBands {
    pub oversold: Decimal,
    pub overbought: Decimal,
}

impl OscillatorBands {
    pub fn validate(&self) -> Result<(), CoreError> {
        let hundred = Decimal::ONE_HUNDRED;
        if self.oversold < Decimal::ZERO || self.overbought > hundred || self.oversold >= self.overbought {
            return Err(CoreError::InvalidInput(
                "oscillator bands".to_string(),
                format!(
                    "expected 0 <= oversold ({}) < overbought ({}) <= 100",
                    self.oversold, self.overbought
                ),
            ));
        }
        Ok(())
    }
}

impl Default for OscillatorBands {
    fn default() -> Self {
        Self {
            oversold: dec!(30),
            overbought: dec!(70),
        }
    }
}
