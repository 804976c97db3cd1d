//! Error types used by the aggregation runtime.
//!
//! The taxonomy follows where each failure is absorbed:
//!
//! - [`ProduceError`] — one producer's fetch failed; absorbed at the provider
//!   task boundary and turned into a `Failed` event.
//! - [`NotifyError`] — bus-level failures that propagate to the immediate
//!   caller (currently only the per-key subscriber capacity check).
//! - [`ChannelClosed`] — publish attempted after channel completion; a
//!   lifecycle bug, not a recoverable condition.
//! - [`OrchestrateError`] — errors surfaced by an orchestrator run.
//!
//! Cancellation is cooperative shutdown, not an error: nothing here models it,
//! except [`ProduceError::Canceled`] which exists so producers can report a
//! graceful abort that must not be recorded as a failure.
//!
//! All types provide `as_label()` returning a short stable snake_case label
//! for logs and metrics.

use thiserror::Error;

/// Publish attempted on a completed event channel.
///
/// `EventChannel::complete` must only be called after all producers stopped
/// publishing; hitting this error indicates a lifecycle bug in the caller.
#[derive(Error, Debug)]
#[error("provider event channel is closed")]
pub struct ChannelClosed;

/// # Errors produced by a producer's fetch.
///
/// Failures are absorbed at the [`ProviderTask`](crate::ProviderTask)
/// boundary: a `Fail` becomes a `Failed` event, a `Canceled` ends the task
/// quietly without emitting anything.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProduceError {
    /// The producer raised an error; the message is carried into the
    /// `Failed` event.
    #[error("producer failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The producer observed cancellation and aborted cooperatively.
    #[error("producer cancelled")]
    Canceled,
}

impl ProduceError {
    /// Convenience constructor for [`ProduceError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ProduceError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProduceError::Fail { .. } => "produce_failed",
            ProduceError::Canceled => "produce_canceled",
        }
    }
}

/// # Errors returned by the notification bus to its immediate caller.
///
/// Sink write failures are *not* represented here: they end the affected
/// subscription only and are absorbed at the per-subscription boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The key already has the configured maximum number of concurrent
    /// subscribers; the new subscription was rejected.
    #[error("too many subscribers for key {key:?} (max {max})")]
    CapacityExceeded {
        /// The topic key the subscription was attempted on.
        key: String,
        /// The configured per-key maximum.
        max: usize,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::CapacityExceeded { .. } => "notify_capacity_exceeded",
        }
    }
}

/// # Errors surfaced by an orchestrator run.
///
/// Producer failures never show up here: they are absorbed into `Failed`
/// events and count toward completion. The only error class that propagates
/// is the programming-error one.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestrateError {
    /// The provider event channel was closed (or its consumer already taken)
    /// while the run still needed it.
    #[error("provider event channel closed while the run was still using it")]
    ChannelClosed(#[from] ChannelClosed),
}

impl OrchestrateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestrateError::ChannelClosed(_) => "orchestrate_channel_closed",
        }
    }
}
