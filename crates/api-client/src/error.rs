use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach the provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Invalid provider base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Deserialization(e.to_string())
    }
}

impl From<core_types::CoreError> for ApiError {
    fn from(e: core_types::CoreError) -> Self {
        ApiError::InvalidData(e.to_string())
    }
}
