use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use dashboard::{DashboardView, ServiceStatus, StockDetailView, TelemetryView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub sector: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub views: ServiceStatus,
}

/// # GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        views: state.service.status().await,
    })
}

/// # GET /api/dashboard?sector=Technology
/// The recommendations table in provider order, optionally filtered by sector.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let view = state.service.dashboard(query.sector.as_deref()).await?;
    Ok(Json(view))
}

/// # GET /api/stocks/:symbol
/// Symbols outside `[A-Z0-9.-]` are answered with 400 before the provider is asked.
pub async fn get_stock_detail(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StockDetailView>, AppError> {
    let view = state.service.stock_detail(&symbol).await?;
    Ok(Json(view))
}

/// # GET /api/telemetry
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TelemetryView>, AppError> {
    let view = state.service.telemetry_view().await?;
    Ok(Json(view))
}

/// # POST /api/refresh
/// Reloads recommendations and telemetry concurrently.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    let (recommendations, telemetry) = tokio::join!(
        state.service.refresh_recommendations(),
        state.service.refresh_telemetry()
    );
    recommendations?;
    telemetry?;
    Ok(StatusCode::NO_CONTENT)
}

/// # POST /api/run-analysis
pub async fn run_analysis(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.service.run_analysis().await?;
    Ok(StatusCode::ACCEPTED)
}
