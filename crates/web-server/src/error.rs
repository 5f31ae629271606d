use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dashboard::DashboardError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Dashboard(DashboardError::UnknownSymbol(symbol)) => (
                StatusCode::NOT_FOUND,
                format!("Symbol '{}' not found", symbol),
            ),
            AppError::Dashboard(DashboardError::InvalidSymbol(reason)) => {
                (StatusCode::BAD_REQUEST, reason.to_string())
            }
            AppError::Dashboard(DashboardError::NotLoaded(view)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("The {:?} view has not been loaded yet", view),
            ),
            AppError::Dashboard(DashboardError::ApiClient(api_err)) => {
                tracing::error!(error = %api_err, "Provider error.");
                (
                    StatusCode::BAD_GATEWAY,
                    format!("The recommendation provider failed: {}", api_err),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
