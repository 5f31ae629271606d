//! # StockLens Events
//!
//! This crate defines the events the dashboard service publishes while it
//! refreshes its views, and the transient notices shown to the user.
//!
//! As a Layer 0 crate, it depends on no other workspace crate and provides the
//! shared language between the service and its front ends (CLI, web server).

// Declare the modules that make up this crate.
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use messages::{DashboardEvent, Notice, NoticeLevel, ViewKind};
