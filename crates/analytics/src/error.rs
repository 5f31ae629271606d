use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0} received an empty series")]
    EmptySeries(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A {window}-point moving average needs {window} prices, got {available}")]
    InsufficientHistory { window: usize, available: usize },

    #[error("Arithmetic overflow in {0}")]
    Overflow(String),
}

impl From<CoreError> for AnalyticsError {
    fn from(err: CoreError) -> Self {
        AnalyticsError::InvalidArgument(err.to_string())
    }
}
