pub mod enums;
pub mod error;
pub mod snapshot;
pub mod structs;
pub mod thresholds;

// Re-export the core types to provide a clean public API.
pub use enums::{
    MomentumDirection, OscillatorZone, Outlook, PricePosition, RecommendationTier, SentimentTier,
    Severity,
};
pub use error::CoreError;
pub use snapshot::{
    MAX_SYMBOL_LEN, NewsItem, Recommendation, RecommendationSnapshot, TechnicalIndicators,
    TelemetrySnapshot, normalize_symbol,
};
pub use structs::{
    CostRecord, DisplayRange, ErrorEvent, HistoryPoint, MomentumIndicator, MovingAveragePoint,
    MovingAverageReading, PricePoint, PriceRange, PriceSeries, SentimentScore, SupportResistance,
    TelemetryCounter,
};
pub use thresholds::{OscillatorBands, SentimentThresholds};
