//! # Outbound notification seam.
//!
//! [`Notify`] is the contract the orchestrator (or any other event source)
//! pushes through. The in-process implementation is
//! [`NotificationBus`](crate::NotificationBus); a distributed deployment
//! could substitute a broker-backed implementation without touching the
//! orchestrator.

use async_trait::async_trait;

/// Contract for pushing named events to all subscribers of a topic key.
///
/// Both operations are best-effort from the caller's perspective: delivery
/// problems are absorbed behind the implementation and never fail the caller.
#[async_trait]
pub trait Notify<E>: Send + Sync + 'static {
    /// Pushes `payload` as event `event` to every subscriber of `key`.
    ///
    /// A key with zero subscribers is not an error; the event is discarded.
    async fn notify(&self, key: &str, event: &str, payload: &E);

    /// Sends a terminal payload to every subscriber of `key` and closes
    /// their queues, ending their streams after remaining items drain.
    async fn complete(&self, key: &str, event: &str);
}
