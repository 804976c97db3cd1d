//! # Provider specification.
//!
//! [`ProviderSpec`] is the static descriptor an orchestrator fans out from:
//! the producer itself, its simulated/expected latency, and whether its
//! completion should trigger a push notification.

use std::time::Duration;

use super::produce::ProducerRef;

/// Static descriptor for one provider run.
///
/// The provider's name comes from the producer and must be unique within an
/// orchestrator instance.
#[derive(Clone)]
pub struct ProviderSpec {
    producer: ProducerRef,
    latency: Duration,
    notify: bool,
}

impl ProviderSpec {
    /// Creates a new specification.
    ///
    /// ### Parameters
    /// - `producer`: the data source to invoke
    /// - `latency`: simulated/expected delay before the fetch
    /// - `notify`: whether completion emits a `Completed` event (pure
    ///   background providers pass `false`; their results still land in the
    ///   cache)
    pub fn new(producer: ProducerRef, latency: Duration, notify: bool) -> Self {
        Self {
            producer,
            latency,
            notify,
        }
    }

    /// Returns a reference to the producer.
    pub fn producer(&self) -> &ProducerRef {
        &self.producer
    }

    /// Convenience: returns the producer name.
    pub fn name(&self) -> &str {
        self.producer.name()
    }

    /// Returns the declared latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// True if completion should trigger a fan-out notification.
    pub fn notify(&self) -> bool {
        self.notify
    }

    /// Returns a new spec with updated latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Returns a new spec with the notify flag updated.
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}
