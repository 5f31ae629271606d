use serde::{Deserialize, Serialize};

/// The discrete sentiment bucket derived from a continuous score.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Negative < Neutral < Positive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentTier {
    Negative,
    Neutral,
    Positive,
}

impl SentimentTier {
    pub fn severity(&self) -> Severity {
        match self {
            SentimentTier::Positive => Severity::Favorable,
            SentimentTier::Neutral => Severity::Caution,
            SentimentTier::Negative => Severity::Adverse,
        }
    }
}

/// The recommendation bucket a provider label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationTier {
    Buy,
    Hold,
    Sell,
}

impl RecommendationTier {
    pub fn severity(&self) -> Severity {
        match self {
            RecommendationTier::Buy => Severity::Favorable,
            RecommendationTier::Hold => Severity::Caution,
            RecommendationTier::Sell => Severity::Adverse,
        }
    }
}

/// A presentation-neutral severity level. The view layer decides what colour,
/// icon or badge each level becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Favorable,
    Caution,
    Adverse,
}

/// Where a bounded oscillator (RSI-style, 0..=100) currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OscillatorZone {
    Oversold,
    Neutral,
    Overbought,
}

/// The sign of a signed momentum value (MACD-style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomentumDirection {
    Bullish,
    Bearish,
    Flat,
}

/// The current price relative to a moving average. A price equal to the
/// average counts as below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricePosition {
    Above,
    Below,
}

impl PricePosition {
    pub fn severity(&self) -> Severity {
        match self {
            PricePosition::Above => Severity::Favorable,
            PricePosition::Below => Severity::Adverse,
        }
    }
}

/// Net outlook of a group of recommendations (e.g. one sector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outlook {
    Bullish,
    Neutral,
    Bearish,
}

impl Outlook {
    pub fn severity(&self) -> Severity {
        match self {
            Outlook::Bullish => Severity::Favorable,
            Outlook::Neutral => Severity::Caution,
            Outlook::Bearish => Severity::Adverse,
        }
    }
}
