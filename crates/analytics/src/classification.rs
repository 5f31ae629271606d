//! Mapping of continuous scores and provider labels onto discrete tiers.

use crate::error::AnalyticsError;
use core_types::{RecommendationTier, SentimentScore, SentimentThresholds, SentimentTier};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Proxy scores used when a sentiment summary has no numeric score attached.
const POSITIVE_PROXY: Decimal = dec!(0.8);
const NEUTRAL_PROXY: Decimal = dec!(0.5);
const NEGATIVE_PROXY: Decimal = dec!(0.2);

/// Classifies a raw sentiment score.
///
/// Scores outside `[0, 1]` are clamped before classification and the clamp is
/// reported through a `warn` event, since provider precision is not trusted.
pub fn classify_sentiment(score: Decimal, thresholds: &SentimentThresholds) -> SentimentTier {
    let (clamped, was_clamped) = SentimentScore::clamped(score);
    if was_clamped {
        tracing::warn!(
            raw_score = %score,
            clamped_score = %clamped.value(),
            "Sentiment score outside [0, 1] was clamped before classification."
        );
    }
    classify_sentiment_score(clamped, thresholds)
}

/// Classifies a score that is already known to be in range.
///
/// `[positive, 1]` is Positive, `[neutral, positive)` is Neutral and
/// `[0, neutral)` is Negative.
pub fn classify_sentiment_score(
    score: SentimentScore,
    thresholds: &SentimentThresholds,
) -> SentimentTier {
    let value = score.value();
    if value >= thresholds.positive {
        SentimentTier::Positive
    } else if value >= thresholds.neutral {
        SentimentTier::Neutral
    } else {
        SentimentTier::Negative
    }
}

/// Derives the tier of a provider recommendation label.
///
/// The label itself is displayed verbatim by callers. Matching ignores case
/// and surrounding whitespace; the "Strong" variants fold into their base tier.
pub fn classify_recommendation(label: &str) -> Result<RecommendationTier, AnalyticsError> {
    match label.trim().to_ascii_lowercase().as_str() {
        "buy" | "strong buy" => Ok(RecommendationTier::Buy),
        "hold" => Ok(RecommendationTier::Hold),
        "sell" | "strong sell" => Ok(RecommendationTier::Sell),
        _ => Err(AnalyticsError::InvalidArgument(format!(
            "unknown recommendation label '{}'",
            label
        ))),
    }
}

/// Approximates a sentiment score from free text.
///
/// This is a coarse keyword heuristic: "positive" wins over "neutral", and a
/// summary mentioning neither is treated as negative.
pub fn sentiment_from_summary(summary: &str) -> SentimentScore {
    let lowered = summary.to_lowercase();
    let proxy = if lowered.contains("positive") {
        POSITIVE_PROXY
    } else if lowered.contains("neutral") {
        NEUTRAL_PROXY
    } else {
        NEGATIVE_PROXY
    };
    SentimentScore::clamped(proxy).0
}
