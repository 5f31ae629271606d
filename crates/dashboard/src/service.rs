use crate::adapter::{
    AdapterSettings, DashboardView, StockDetailView, TelemetryView, to_dashboard_view,
    to_stock_detail, to_telemetry_view,
};
use crate::error::DashboardError;
use crate::refresh::{Completion, ViewState};
use analytics::AnalyticsEngine;
use api_client::ApiClient;
use api_client::error::ApiError;
use core_types::{Recommendation, RecommendationSnapshot, TelemetrySnapshot, normalize_symbol};
use events::{DashboardEvent, Notice, ViewKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

const EVENT_CAPACITY: usize = 64;

/// Which views currently hold a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ServiceStatus {
    pub recommendations_loaded: bool,
    pub telemetry_loaded: bool,
    /// Symbols with a detail state; only symbols that have loaded at least once stay.
    pub tracked_symbols: usize,
}

/// The orchestrator behind every front end.
///
/// It owns one `ViewState` per view, fetches snapshots through the `ApiClient`
/// and recomputes view records from the last good snapshot on every read.
pub struct DashboardService {
    api_client: Arc<dyn ApiClient>,
    settings: AdapterSettings,
    events: broadcast::Sender<DashboardEvent>,

    recommendations: Mutex<ViewState<RecommendationSnapshot>>,
    telemetry: Mutex<ViewState<TelemetrySnapshot>>,
    details: Mutex<HashMap<String, ViewState<Recommendation>>>,
}

impl DashboardService {
    pub fn new(api_client: Arc<dyn ApiClient>, settings: AdapterSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api_client,
            settings,
            events,
            recommendations: Mutex::new(ViewState::new()),
            telemetry: Mutex::new(ViewState::new()),
            details: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            recommendations_loaded: self.recommendations.lock().await.last_good().is_some(),
            telemetry_loaded: self.telemetry.lock().await.last_good().is_some(),
            tracked_symbols: self.details.lock().await.len(),
        }
    }

    /// Fetches a new recommendations snapshot.
    ///
    /// On failure the previous snapshot stays in place, a `Notice` is
    /// published and the fetch error is returned. There is no retry.
    pub async fn refresh_recommendations(&self) -> Result<(), DashboardError> {
        let ticket = self.recommendations.lock().await.begin();
        let result = self.api_client.fetch_recommendations().await;

        let mut state = self.recommendations.lock().await;
        match result {
            Ok(snapshot) => {
                let (count, fetched_at) = (snapshot.records.len(), snapshot.fetched_at);
                let completion = state.complete::<ApiError>(ticket, Ok(snapshot));
                drop(state);
                if completion == Completion::Applied {
                    tracing::info!(count, "Recommendations refreshed.");
                    self.publish(DashboardEvent::RecommendationsRefreshed { count, fetched_at });
                }
                Ok(())
            }
            Err(e) => {
                let completion = state.complete(ticket, Err(&e));
                drop(state);
                if completion == Completion::Applied {
                    self.report_failure(ViewKind::Recommendations, &e);
                }
                Err(e.into())
            }
        }
    }

    pub async fn refresh_telemetry(&self) -> Result<(), DashboardError> {
        let ticket = self.telemetry.lock().await.begin();
        let result = self.api_client.fetch_telemetry().await;

        let mut state = self.telemetry.lock().await;
        match result {
            Ok(snapshot) => {
                let fetched_at = snapshot.fetched_at;
                let completion = state.complete::<ApiError>(ticket, Ok(snapshot));
                drop(state);
                if completion == Completion::Applied {
                    tracing::info!(%fetched_at, "Telemetry refreshed.");
                    self.publish(DashboardEvent::TelemetryRefreshed { fetched_at });
                }
                Ok(())
            }
            Err(e) => {
                let completion = state.complete(ticket, Err(&e));
                drop(state);
                if completion == Completion::Applied {
                    self.report_failure(ViewKind::Telemetry, &e);
                }
                Err(e.into())
            }
        }
    }

    /// Asks the provider for a fresh analysis, then reloads the recommendations.
    pub async fn run_analysis(&self) -> Result<(), DashboardError> {
        if let Err(e) = self.api_client.trigger_analysis().await {
            self.report_failure(ViewKind::Recommendations, &e);
            return Err(e.into());
        }
        self.publish(DashboardEvent::AnalysisTriggered);
        self.refresh_recommendations().await?;

        let count = self
            .recommendations
            .lock()
            .await
            .last_good()
            .map_or(0, |snapshot| snapshot.records.len());
        self.publish(DashboardEvent::Notice(Notice::success(
            "Analysis Complete",
            format!("Stock recommendations have been updated ({} symbols).", count),
        )));
        Ok(())
    }

    /// The recommendations view, optionally restricted to one sector.
    pub async fn dashboard(&self, sector: Option<&str>) -> Result<DashboardView, DashboardError> {
        let snapshot = self
            .recommendations
            .lock()
            .await
            .last_good()
            .cloned()
            .ok_or(DashboardError::NotLoaded(ViewKind::Recommendations))?;
        Ok(to_dashboard_view(&snapshot, sector, &self.settings))
    }

    pub async fn telemetry_view(&self) -> Result<TelemetryView, DashboardError> {
        let snapshot = self
            .telemetry
            .lock()
            .await
            .last_good()
            .cloned()
            .ok_or(DashboardError::NotLoaded(ViewKind::Telemetry))?;
        let report = AnalyticsEngine::new(self.settings.engine.clone()).telemetry(&snapshot);
        Ok(to_telemetry_view(report))
    }

    /// Fetches one symbol and builds its detail view.
    ///
    /// The symbol is validated before anything is fetched. When the fetch
    /// fails, the last good record of that symbol is used instead; a symbol
    /// that never loaded surfaces the fetch error and leaves no state behind.
    pub async fn stock_detail(&self, symbol: &str) -> Result<StockDetailView, DashboardError> {
        let key = normalize_symbol(symbol)?;
        let ticket = self.details.lock().await.entry(key.clone()).or_default().begin();
        let result = self.api_client.fetch_recommendation(&key).await;

        let mut details = self.details.lock().await;
        let state = details.entry(key.clone()).or_default();
        let record = match result {
            Ok(record) => {
                state.complete::<ApiError>(ticket, Ok(record.clone()));
                // A newer response may already have replaced this one.
                state.last_good().map_or(record, |newest| Recommendation::clone(newest))
            }
            Err(e) => {
                let completion = state.complete(ticket, Err(&e));
                let last_good = state.last_good().map(|newest| Recommendation::clone(newest));
                if last_good.is_none() && !state.is_fetching() {
                    details.remove(&key);
                }
                drop(details);

                if completion == Completion::Applied {
                    self.report_failure(ViewKind::StockDetail, &e);
                }
                match (last_good, e) {
                    (Some(record), _) => record,
                    (None, ApiError::Status { status: 404, .. }) => {
                        return Err(DashboardError::UnknownSymbol(key));
                    }
                    (None, e) => return Err(e.into()),
                }
            }
        };

        Ok(to_stock_detail(&record, &self.settings))
    }

    fn report_failure(&self, view: ViewKind, error: &ApiError) {
        tracing::error!(?view, %error, "Refresh failed; keeping last good snapshot.");
        self.publish(DashboardEvent::Notice(Notice::error(
            format!("Error fetching {:?}", view),
            error.to_string(),
        )));
        self.publish(DashboardEvent::RefreshFailed {
            view,
            reason: error.to_string(),
        });
    }

    fn publish(&self, event: DashboardEvent) {
        // No subscribers is fine; events are informational.
        let _ = self.events.send(event);
    }
}
