//! # Lifecycle events reported by provider tasks.
//!
//! Each [`ProviderEvent`] names the producer it came from and carries a
//! wall-clock timestamp. The [`EventKind`] variants carry disjoint payloads:
//!
//! - [`EventKind::Started`] — informational; the drain loop does not emit a
//!   snapshot for it.
//! - [`EventKind::Completed`] — the producer's batch, already written to the
//!   result cache by the task that emitted it.
//! - [`EventKind::Failed`] — the error text; no records were stored.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::records::Record;

/// Classification and payload of a provider lifecycle event.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// The provider began its run and expects to take roughly
    /// `expected_delay` before reporting.
    Started {
        /// The provider's declared latency.
        expected_delay: Duration,
    },

    /// The provider finished successfully with `records`.
    Completed {
        /// The batch the provider stored in the cache.
        records: Vec<Record>,
    },

    /// The provider's fetch raised an error.
    Failed {
        /// Human-readable failure message.
        error: String,
    },
}

/// One provider lifecycle event. Immutable, consumed exactly once.
#[derive(Debug, Clone)]
pub struct ProviderEvent {
    /// Wall-clock timestamp taken at construction.
    pub at: SystemTime,
    /// Name of the provider this event refers to.
    pub name: Arc<str>,
    /// Event classification and payload.
    pub kind: EventKind,
}

impl ProviderEvent {
    fn new(name: impl Into<Arc<str>>, kind: EventKind) -> Self {
        Self {
            at: SystemTime::now(),
            name: name.into(),
            kind,
        }
    }

    /// Creates a `Started` event.
    pub fn started(name: impl Into<Arc<str>>, expected_delay: Duration) -> Self {
        Self::new(name, EventKind::Started { expected_delay })
    }

    /// Creates a `Completed` event carrying the provider's batch.
    pub fn completed(name: impl Into<Arc<str>>, records: Vec<Record>) -> Self {
        Self::new(name, EventKind::Completed { records })
    }

    /// Creates a `Failed` event carrying the error text.
    pub fn failed(name: impl Into<Arc<str>>, error: impl Into<String>) -> Self {
        Self::new(
            name,
            EventKind::Failed {
                error: error.into(),
            },
        )
    }

    /// True for `Completed` and `Failed`: the events that mark a provider as
    /// finished and trigger a snapshot from the drain loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Completed { .. } | EventKind::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        let started = ProviderEvent::started("p", Duration::from_secs(2));
        let completed = ProviderEvent::completed("p", Vec::new());
        let failed = ProviderEvent::failed("p", "boom");

        assert!(!started.is_terminal());
        assert!(completed.is_terminal());
        assert!(failed.is_terminal());
    }

    #[test]
    fn test_failed_carries_error_text() {
        let ev = ProviderEvent::failed("p", "connection refused");
        match ev.kind {
            EventKind::Failed { error } => assert_eq!(error, "connection refused"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
