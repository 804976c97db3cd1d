//! # Outbound notification: keyed pub/sub over per-subscriber queues.
//!
//! This module contains the push side of the runtime. The only state holder
//! is [`NotificationBus`]; everything else is a seam:
//!
//! - [`Notify`] — the producer-facing contract (implemented by the bus)
//! - [`EventSink`] — the subscriber-facing transport contract
//! - [`SseWriter`] — SSE framing over any `AsyncWrite`
//!
//! Internal modules:
//! - [`bus`]: registry, capacity enforcement, fan-out, completion;
//! - [`subscription`]: one subscriber's queue, heartbeat, and lifetime loop.

mod bus;
mod notifier;
mod sink;
mod subscription;

pub use bus::NotificationBus;
pub use notifier::Notify;
pub use sink::{EventSink, SseWriter};
