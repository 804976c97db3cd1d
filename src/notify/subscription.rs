//! # One subscriber's per-connection state and delivery loop.
//!
//! A [`Subscription`] owns the receiving half of its outbound queue plus its
//! lifetime bounds. [`Subscription::run`] drives delivery until the first of:
//!
//! - the queue is closed (bus `complete()` or bus drop) — remaining queued
//!   items are delivered first;
//! - a sink write fails or panics — the failure ends this subscription only;
//! - the caller's token is cancelled;
//! - the absolute lifetime ceiling elapses.
//!
//! Heartbeats are written directly to the sink, bypassing the queue, so a
//! quiet session still keeps its transport alive.
//!
//! ## Rules
//! - The loop is the single writer to the sink; queued events and heartbeats
//!   never interleave mid-frame.
//! - Sink panics are caught ([`futures::FutureExt::catch_unwind`]) and
//!   treated as sink failure; nothing propagates to the bus.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use serde_json::json;
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::sink::EventSink;

/// One serialized event queued for delivery to a subscriber.
#[derive(Clone)]
pub(crate) struct OutboundEvent {
    pub(crate) name: std::sync::Arc<str>,
    pub(crate) data: std::sync::Arc<str>,
}

/// Registry-side handle: the sending half of a subscriber's queue.
pub(crate) struct SubscriberHandle {
    pub(crate) tx: UnboundedSender<OutboundEvent>,
}

/// Why a subscription's delivery loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubscriptionEnd {
    /// The outbound queue was closed; all queued items were delivered.
    QueueClosed,
    /// A sink write failed or panicked.
    SinkFailed,
    /// The caller's cancellation token fired.
    Cancelled,
    /// The absolute lifetime ceiling elapsed.
    DeadlineExpired,
}

/// Per-connection subscriber state.
pub(crate) struct Subscription {
    id: Uuid,
    queue: UnboundedReceiver<OutboundEvent>,
    created_at: Instant,
    deadline: Instant,
}

impl Subscription {
    pub(crate) fn new(id: Uuid, queue: UnboundedReceiver<OutboundEvent>, lifetime: Duration) -> Self {
        let created_at = Instant::now();
        Self {
            id,
            queue,
            created_at,
            deadline: created_at + lifetime,
        }
    }

    /// Drives delivery until the subscription ends; see module docs for the
    /// termination conditions.
    pub(crate) async fn run<S: EventSink>(
        mut self,
        sink: &mut S,
        heartbeat_every: Duration,
        token: &CancellationToken,
    ) -> SubscriptionEnd {
        let end = self.drive(sink, heartbeat_every, token).await;
        tracing::debug!(
            subscriber = %self.id,
            age = ?self.created_at.elapsed(),
            end = ?end,
            "subscription ended"
        );
        end
    }

    async fn drive<S: EventSink>(
        &mut self,
        sink: &mut S,
        heartbeat_every: Duration,
        token: &CancellationToken,
    ) -> SubscriptionEnd {
        let connected = format!("connected {}", Utc::now().to_rfc3339());
        if let Err(end) = self.write_comment(sink, &connected).await {
            return end;
        }

        let mut heartbeat = time::interval_at(Instant::now() + heartbeat_every, heartbeat_every);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let lifetime = time::sleep_until(self.deadline);
        tokio::pin!(lifetime);

        loop {
            select! {
                maybe = self.queue.recv() => match maybe {
                    Some(ev) => {
                        if let Err(end) = self.write_event(sink, &ev.name, &ev.data).await {
                            return end;
                        }
                    }
                    None => return SubscriptionEnd::QueueClosed,
                },
                _ = heartbeat.tick() => {
                    let payload =
                        json!({"type": "heartbeat", "timestamp": Utc::now().to_rfc3339()})
                            .to_string();
                    if let Err(end) = self.write_event(sink, "heartbeat", &payload).await {
                        return end;
                    }
                }
                _ = token.cancelled() => return SubscriptionEnd::Cancelled,
                _ = &mut lifetime => return SubscriptionEnd::DeadlineExpired,
            }
        }
    }

    async fn write_event<S: EventSink>(
        &self,
        sink: &mut S,
        name: &str,
        data: &str,
    ) -> Result<(), SubscriptionEnd> {
        let fut = sink.send_event(name, data);
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::debug!(subscriber = %self.id, error = %err, "sink write failed");
                Err(SubscriptionEnd::SinkFailed)
            }
            Err(_panic) => {
                tracing::warn!(subscriber = %self.id, "sink panicked during write");
                Err(SubscriptionEnd::SinkFailed)
            }
        }
    }

    async fn write_comment<S: EventSink>(
        &self,
        sink: &mut S,
        text: &str,
    ) -> Result<(), SubscriptionEnd> {
        let fut = sink.send_comment(text);
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::debug!(subscriber = %self.id, error = %err, "sink write failed");
                Err(SubscriptionEnd::SinkFailed)
            }
            Err(_panic) => {
                tracing::warn!(subscriber = %self.id, "sink panicked during write");
                Err(SubscriptionEnd::SinkFailed)
            }
        }
    }
}
