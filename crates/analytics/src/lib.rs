//! # StockLens Analytics Engine
//!
//! Turns raw price series and raw telemetry counters into the classified,
//! bucketed and summarized values that the dashboard views display.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of the provider. The crate depends
//!   only on `core-types`.
//! - **Stateless calculation:** every function derives a new value from its
//!   inputs. Nothing is cached between snapshots.
//!
//! ## Public API
//!
//! - `classification`: sentiment and recommendation tiers.
//! - `series`: moving averages, price ranges, momentum zoning, support/resistance.
//! - `telemetry`: rates, nearest-rank percentiles, cost accounting.
//! - `AnalyticsEngine`: assembles `TelemetryReport`s and `TechnicalReport`s.

pub mod classification;
pub mod engine;
pub mod error;
pub mod report;
pub mod series;
pub mod telemetry;

pub use engine::{AnalyticsEngine, EngineSettings};
pub use error::AnalyticsError;
pub use report::{TechnicalReport, TelemetryReport};
