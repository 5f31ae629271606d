use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// A transient message for the user, e.g. a failed fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub timestamp: DateTime<Utc>,
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }
}

/// The independently refreshed views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    Recommendations,
    Telemetry,
    StockDetail,
}

/// Every event published by the dashboard service.
///
/// Serialized with an adjacent tag so front ends can switch on `type`:
/// `{ "type": "RecommendationsRefreshed", "payload": { "count": 3, ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DashboardEvent {
    Notice(Notice),
    RecommendationsRefreshed {
        count: usize,
        fetched_at: DateTime<Utc>,
    },
    TelemetryRefreshed {
        fetched_at: DateTime<Utc>,
    },
    /// A fetch failed; the view still holds its last good snapshot, if any.
    RefreshFailed {
        view: ViewKind,
        reason: String,
    },
    AnalysisTriggered,
}
