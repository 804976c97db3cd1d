//! # Event channel: multi-writer, single-reader pipe of provider events.
//!
//! [`EventChannel`] decouples producer completion from orchestrator polling:
//! provider tasks publish lifecycle events without blocking, and one dedicated
//! drain loop consumes them in FIFO order.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                       Consumer (exactly one):
//!   ProviderTask 1 ──┐
//!   ProviderTask 2 ──┼──► EventChannel ──► Orchestrator drain loop
//!   ProviderTask N ──┘   (unbounded mpsc)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never suspends; the queue is
//!   unbounded.
//! - **Single consumer**: `subscribe()` hands out the receiving half exactly
//!   once and is not restartable.
//! - **Completion**: `complete()` is idempotent; the consumer sees all
//!   already-queued events before the stream terminates.
//! - A publish after `complete()` fails with [`ChannelClosed`] — a lifecycle
//!   bug in the caller, not a recoverable condition.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::ChannelClosed;

use super::event::ProviderEvent;

/// Unordered, unbounded, single-consumer pipe of [`ProviderEvent`].
///
/// Shared between provider tasks and the orchestrator via `Arc`.
pub struct EventChannel {
    tx: Mutex<Option<UnboundedSender<ProviderEvent>>>,
    rx: Mutex<Option<UnboundedReceiver<ProviderEvent>>>,
}

impl EventChannel {
    /// Creates a new, open channel.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Publishes an event to the channel.
    ///
    /// Never blocks beyond the runtime's queuing cost. Fails with
    /// [`ChannelClosed`] if [`EventChannel::complete`] was already called or
    /// the consumer was dropped.
    pub fn publish(&self, event: ProviderEvent) -> Result<(), ChannelClosed> {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => tx.send(event).map_err(|_| ChannelClosed),
            None => Err(ChannelClosed),
        }
    }

    /// Takes the receiving half of the channel.
    ///
    /// Returns `None` on every call after the first: the event sequence is
    /// lazy, infinite until completion, and consumable exactly once.
    pub fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Closes the channel for publishing. Idempotent.
    ///
    /// Must only be called once all producers have stopped publishing. The
    /// consumer's stream terminates after already-queued events drain.
    pub fn complete(&self) {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order_and_drain_after_complete() {
        let channel = EventChannel::new();
        channel
            .publish(ProviderEvent::started("a", Duration::from_secs(1)))
            .expect("open channel accepts publish");
        channel
            .publish(ProviderEvent::completed("a", Vec::new()))
            .expect("open channel accepts publish");
        channel.complete();

        let mut rx = channel.subscribe().expect("first subscribe succeeds");
        let first = rx.recv().await.expect("buffered event survives complete");
        let second = rx.recv().await.expect("buffered event survives complete");
        assert!(!first.is_terminal());
        assert!(second.is_terminal());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_after_complete_fails() {
        let channel = EventChannel::new();
        channel.complete();
        channel.complete(); // idempotent

        let err = channel
            .publish(ProviderEvent::failed("a", "late"))
            .expect_err("publish after complete must fail");
        assert_eq!(err.to_string(), "provider event channel is closed");
    }

    #[test]
    fn test_subscribe_is_take_once() {
        let channel = EventChannel::new();
        assert!(channel.subscribe().is_some());
        assert!(channel.subscribe().is_none());
    }
}
