use axum::{
    Router,
    routing::{get, post},
};
use dashboard::DashboardService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub service: Arc<DashboardService>,
}

/// Builds the router with every route and middleware attached.
pub fn router(service: Arc<DashboardService>) -> Router {
    let app_state = Arc::new(AppState { service });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/stocks/:symbol", get(handlers::get_stock_detail))
        .route("/api/telemetry", get(handlers::get_telemetry))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/run-analysis", post(handlers::run_analysis))
        .with_state(app_state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Configures and runs the web server until it is shut down.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(addr: SocketAddr, service: Arc<DashboardService>) -> anyhow::Result<()> {
    // Warm the views once; a provider outage at startup is not fatal.
    let (recommendations, telemetry) = tokio::join!(
        service.refresh_recommendations(),
        service.refresh_telemetry()
    );
    if let Err(e) = recommendations {
        tracing::warn!(error = %e, "Initial recommendations fetch failed.");
    }
    if let Err(e) = telemetry {
        tracing::warn!(error = %e, "Initial telemetry fetch failed.");
    }

    let app = router(service);

    tracing::info!("Web server started and listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
