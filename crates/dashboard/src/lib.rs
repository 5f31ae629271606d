//! # StockLens Dashboard
//!
//! The orchestration layer between the provider and the front ends.
//!
//! - `adapter`: pure functions from validated snapshots to flat view records.
//! - `refresh`: the per-view refresh state machine with its stale-response guard.
//! - `service`: `DashboardService`, which owns the view states, talks to the
//!   provider through an `ApiClient` and publishes `DashboardEvent`s.

pub mod adapter;
pub mod error;
pub mod refresh;
pub mod service;

pub use adapter::{
    AdapterSettings, DashboardView, MovingAverageView, SentimentSource, StockDetailView,
    StockViewRecord, TelemetryView, TrendReading, Widget,
};
pub use error::DashboardError;
pub use refresh::{Completion, RefreshTicket, ViewPhase, ViewState};
pub use service::{DashboardService, ServiceStatus};
