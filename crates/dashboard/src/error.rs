use events::ViewKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("API client error: {0}")]
    ApiClient(#[from] api_client::error::ApiError),

    #[error("The {0:?} view has not been loaded yet.")]
    NotLoaded(ViewKind),

    #[error("Symbol '{0}' not found.")]
    UnknownSymbol(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(#[from] core_types::CoreError),
}
