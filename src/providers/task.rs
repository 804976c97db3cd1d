//! # Run a single provider from start to terminal event.
//!
//! [`ProviderTask`] wraps one producer's execution: wait out the declared
//! latency, invoke the producer, store the batch, report lifecycle events.
//! A task exists for the duration of one run and is not reused.
//!
//! ## Event flow
//! ```text
//! Start:
//!   publish Started{expected_delay}
//!
//! Success:
//!   cache.add_result() → publish Completed{records}   (only if notify flag set)
//!
//! Failure:
//!   cache.mark_failed() → publish Failed{error}       (no records stored)
//!
//! Cancellation during the latency wait:
//!   return — no terminal event, cache untouched
//! ```
//!
//! ## Rules
//! - The latency wait is the sole suspension point where cancellation is
//!   observed before work begins.
//! - A failed producer counts toward completion without contributing records.
//! - `ProduceError::Canceled` from the producer is a graceful abort: no
//!   terminal event, no cache write.
//! - Without an event channel the task still updates the cache (polling-style
//!   background runs).

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::cache::ResultCache;
use crate::error::{ChannelClosed, ProduceError};
use crate::events::{EventChannel, ProviderEvent};

use super::spec::ProviderSpec;

/// Executes one producer run, reporting lifecycle events.
pub struct ProviderTask {
    spec: ProviderSpec,
    cache: Arc<ResultCache>,
    channel: Option<Arc<EventChannel>>,
}

impl ProviderTask {
    /// Creates a task for one provider run.
    ///
    /// `channel` is optional: polling-style runs pass `None` and only the
    /// cache observes the outcome.
    pub fn new(
        spec: ProviderSpec,
        cache: Arc<ResultCache>,
        channel: Option<Arc<EventChannel>>,
    ) -> Self {
        Self {
            spec,
            cache,
            channel,
        }
    }

    /// Runs the provider to its terminal state.
    ///
    /// Returns `Err(ChannelClosed)` only when an event publish hits a closed
    /// channel — a lifecycle bug in the orchestration around this task, never
    /// a data-path failure.
    pub async fn run(self, ctx: CancellationToken) -> Result<(), ChannelClosed> {
        let name = self.spec.name().to_string();
        let latency = self.spec.latency();

        tracing::debug!(provider = %name, latency = ?latency, "provider starting");
        self.publish(ProviderEvent::started(name.as_str(), latency))?;

        // Sole pre-work cancellation point.
        let sleep = time::sleep(latency);
        tokio::pin!(sleep);
        select! {
            _ = &mut sleep => {}
            _ = ctx.cancelled() => {
                tracing::debug!(provider = %name, "provider cancelled during latency wait");
                return Ok(());
            }
        }

        match self.spec.producer().fetch(ctx).await {
            Ok(records) => {
                tracing::debug!(provider = %name, count = records.len(), "provider completed");
                self.cache.add_result(name.as_str(), records.clone());
                if self.spec.notify() {
                    self.publish(ProviderEvent::completed(name.as_str(), records))?;
                }
            }
            Err(ProduceError::Canceled) => {
                tracing::debug!(provider = %name, "provider cancelled during fetch");
            }
            Err(err) => {
                tracing::warn!(provider = %name, error = %err, "provider failed");
                self.cache.mark_failed(name.as_str());
                self.publish(ProviderEvent::failed(name.as_str(), err.to_string()))?;
            }
        }

        Ok(())
    }

    fn publish(&self, event: ProviderEvent) -> Result<(), ChannelClosed> {
        match &self.channel {
            Some(channel) => channel.publish(event),
            None => Ok(()),
        }
    }
}
