//! Refresh state of one independently fetched view.
//!
//! A view moves `Idle -> Fetching -> Ready | Failed`. Every fetch is started
//! with [`ViewState::begin`], which hands out a generation ticket; only the
//! result carrying the newest ticket is applied, so a slow response can never
//! overwrite a newer one. A failed fetch keeps the last good snapshot.

use std::fmt::Display;
use std::sync::Arc;

/// Generation number of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPhase<T> {
    Idle,
    Fetching { last_good: Option<Arc<T>> },
    Ready(Arc<T>),
    Failed { reason: String, last_good: Option<Arc<T>> },
}

/// What `complete` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer fetch was started after this one; the result was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ViewState<T> {
    phase: ViewPhase<T>,
    latest: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Idle,
            latest: 0,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ViewPhase<T> {
        &self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, ViewPhase::Fetching { .. })
    }

    /// The newest successfully fetched snapshot, whatever the current phase.
    pub fn last_good(&self) -> Option<&Arc<T>> {
        match &self.phase {
            ViewPhase::Idle => None,
            ViewPhase::Ready(snapshot) => Some(snapshot),
            ViewPhase::Fetching { last_good } | ViewPhase::Failed { last_good, .. } => {
                last_good.as_ref()
            }
        }
    }

    /// Starts a fetch and supersedes every ticket issued before.
    pub fn begin(&mut self) -> RefreshTicket {
        self.latest += 1;
        self.phase = ViewPhase::Fetching {
            last_good: self.last_good().cloned(),
        };
        RefreshTicket(self.latest)
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    pub fn complete<E: Display>(&mut self, ticket: RefreshTicket, result: Result<T, E>) -> Completion {
        if ticket.0 != self.latest {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest,
                "Discarding superseded refresh result."
            );
            return Completion::Stale;
        }

        self.phase = match result {
            Ok(snapshot) => ViewPhase::Ready(Arc::new(snapshot)),
            Err(e) => ViewPhase::Failed {
                reason: e.to_string(),
                last_good: self.last_good().cloned(),
            },
        };
        Completion::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_without_snapshot() {
        let state: ViewState<u32> = ViewState::new();
        assert_eq!(state.phase(), &ViewPhase::Idle);
        assert!(state.last_good().is_none());
    }

    #[test]
    fn successful_fetch_becomes_ready() {
        let mut state = ViewState::new();
        let ticket = state.begin();
        assert!(state.is_fetching());

        assert_eq!(state.complete::<String>(ticket, Ok(7)), Completion::Applied);
        assert_eq!(state.phase(), &ViewPhase::Ready(Arc::new(7)));
    }

    #[test]
    fn failure_keeps_last_good_snapshot() {
        let mut state = ViewState::new();
        let first = state.begin();
        state.complete::<String>(first, Ok(1));

        let second = state.begin();
        assert_eq!(state.last_good().map(|s| **s), Some(1));
        state.complete(second, Err("timeout"));

        match state.phase() {
            ViewPhase::Failed { reason, last_good } => {
                assert_eq!(reason, "timeout");
                assert_eq!(last_good.as_deref(), Some(&1));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut state = ViewState::new();
        let slow = state.begin();
        let fast = state.begin();
        assert!(fast > slow);

        assert_eq!(state.complete::<String>(fast, Ok("new")), Completion::Applied);
        assert_eq!(state.complete::<String>(slow, Ok("old")), Completion::Stale);
        assert_eq!(state.last_good().map(|s| **s), Some("new"));
    }

    #[test]
    fn stale_failure_does_not_replace_newer_fetch() {
        let mut state: ViewState<u32> = ViewState::new();
        let slow = state.begin();
        let _fast = state.begin();

        assert_eq!(state.complete(slow, Err("boom")), Completion::Stale);
        assert!(state.is_fetching());
    }
}
