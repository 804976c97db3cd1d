//! # NotificationBus: session-keyed fan-out to live subscribers.
//!
//! Routes named events from any producer (typically an orchestrator) to all
//! subscribers registered under a topic key, independent of transport.
//!
//! ## Architecture
//! ```text
//!   notify(key, event, payload)
//!        │  serialize once
//!        ▼
//!   DashMap<key, bucket>                 (fine-grained shard locking)
//!        │
//!        ├──────► [queue S1] ─► Subscription loop S1 ─► sink S1
//!        ├──────► [queue S2] ─► Subscription loop S2 ─► sink S2
//!        └──────► [queue SN] ─► Subscription loop SN ─► sink SN
//! ```
//!
//! ## Rules
//! - **Back-pressure isolation**: one queue per subscriber; a slow consumer
//!   never stalls the others or the publisher.
//! - **Best effort**: enqueueing onto a closed queue drops the event for that
//!   subscriber; a key with zero subscribers discards the event. The bus does
//!   not buffer for late joiners.
//! - **Capacity**: at most `max_subscribers_per_key` concurrent subscribers
//!   per key (default 10); the next subscribe is rejected.
//! - **Teardown**: registration is always removed when a subscription ends,
//!   and a key's bucket is dropped once empty. Dropping the bus closes every
//!   queue.
//! - No registry lock is ever held across an await point.

use std::collections::HashMap;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::NotifyConfig;
use crate::error::NotifyError;

use super::sink::EventSink;
use super::subscription::{OutboundEvent, SubscriberHandle, Subscription};

type Bucket = HashMap<Uuid, SubscriberHandle>;

/// Keyed pub/sub with per-subscriber queues, heartbeats, and lifetime bounds.
///
/// Cheap to share via `Arc`; all methods take `&self`.
#[derive(Default)]
pub struct NotificationBus {
    cfg: NotifyConfig,
    subscriptions: DashMap<String, Bucket>,
}

impl NotificationBus {
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(NotifyConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(cfg: NotifyConfig) -> Self {
        Self {
            cfg,
            subscriptions: DashMap::new(),
        }
    }

    /// Registers a subscriber under `key` and drives its delivery loop until
    /// the subscription ends.
    ///
    /// Sends an initial `connected` marker, then pumps queued events and
    /// periodic heartbeats into `sink` until the queue closes, a sink write
    /// fails, `token` is cancelled, or the lifetime ceiling elapses. The
    /// registration is removed on every exit path.
    ///
    /// ### Errors
    /// [`NotifyError::CapacityExceeded`] if `key` already has the configured
    /// maximum number of concurrent subscribers. Sink failures are absorbed:
    /// they end this subscription and return `Ok(())`.
    pub async fn subscribe<S: EventSink>(
        &self,
        key: &str,
        mut sink: S,
        token: CancellationToken,
    ) -> Result<(), NotifyError> {
        let (id, rx) = self.register(key)?;
        tracing::info!(subscriber = %id, key, "subscriber connected");

        let subscription = Subscription::new(id, rx, self.cfg.subscription_lifetime);
        let end = subscription
            .run(&mut sink, self.cfg.heartbeat_interval, &token)
            .await;

        self.unregister(key, id);
        tracing::info!(subscriber = %id, key, end = ?end, "subscriber disconnected");
        Ok(())
    }

    /// Pushes `payload` as event `event` to every current subscriber of `key`.
    ///
    /// The payload is serialized exactly once; each subscriber's queue gets a
    /// shared handle to the result. Delivery is best-effort: a closed queue
    /// drops the event for that subscriber, and a key with zero subscribers
    /// is not an error. Never blocks beyond the queuing cost.
    pub fn notify<E: Serialize + ?Sized>(&self, key: &str, event: &str, payload: &E) {
        let data: std::sync::Arc<str> = match serde_json::to_string(payload) {
            Ok(json) => json.into(),
            Err(err) => {
                tracing::error!(key, event, error = %err, "failed to serialize event payload");
                return;
            }
        };
        let name: std::sync::Arc<str> = event.into();

        let Some(bucket) = self.subscriptions.get(key) else {
            tracing::trace!(key, event, "no subscribers; event discarded");
            return;
        };
        for (id, handle) in bucket.iter() {
            let outbound = OutboundEvent {
                name: name.clone(),
                data: data.clone(),
            };
            if handle.tx.send(outbound).is_err() {
                tracing::debug!(subscriber = %id, key, "queue closed; event dropped");
            }
        }
    }

    /// Sends a terminal `{"status":"finished"}` payload to every current
    /// subscriber of `key`, then closes their queues.
    ///
    /// Each subscriber's loop ends after delivering its remaining queued
    /// items. The key's bucket is removed immediately, so later `notify`
    /// calls on the same key are discarded.
    pub fn complete(&self, key: &str, event: &str) {
        let Some((_, bucket)) = self.subscriptions.remove(key) else {
            return;
        };
        let data: std::sync::Arc<str> = serde_json::json!({"status": "finished"})
            .to_string()
            .into();
        let name: std::sync::Arc<str> = event.into();

        for (id, handle) in bucket {
            let outbound = OutboundEvent {
                name: name.clone(),
                data: data.clone(),
            };
            if handle.tx.send(outbound).is_err() {
                tracing::debug!(subscriber = %id, key, "queue closed before completion");
            }
            // Dropping the handle closes the queue; the pump drains and ends.
        }
        tracing::info!(key, "completed all subscriptions");
    }

    /// Number of current subscribers for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscriptions.get(key).map_or(0, |b| b.len())
    }

    /// Adds a subscriber to the key's bucket, enforcing the capacity limit.
    ///
    /// The check and the insert happen under the same bucket entry, so a
    /// racing subscribe cannot overshoot the limit.
    fn register(&self, key: &str) -> Result<(Uuid, UnboundedReceiver<OutboundEvent>), NotifyError> {
        let max = self.cfg.max_subscribers_per_key.max(1);
        let mut bucket = self.subscriptions.entry(key.to_string()).or_default();
        if bucket.len() >= max {
            tracing::warn!(key, max, "subscriber capacity reached");
            return Err(NotifyError::CapacityExceeded {
                key: key.to_string(),
                max,
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        bucket.insert(id, SubscriberHandle { tx });
        Ok((id, rx))
    }

    /// Removes a subscriber; drops the key's bucket once empty.
    fn unregister(&self, key: &str, id: Uuid) {
        if let Some(mut bucket) = self.subscriptions.get_mut(key) {
            bucket.remove(&id);
            if !bucket.is_empty() {
                return;
            }
        } else {
            return;
        }
        // The guard above is dropped here; re-check emptiness under the entry
        // lock since another subscriber may have registered in between.
        self.subscriptions.remove_if(key, |_, bucket| bucket.is_empty());
    }
}

#[async_trait::async_trait]
impl<E> super::notifier::Notify<E> for NotificationBus
where
    E: Serialize + Send + Sync + 'static,
{
    async fn notify(&self, key: &str, event: &str, payload: &E) {
        NotificationBus::notify(self, key, event, payload);
    }

    async fn complete(&self, key: &str, event: &str) {
        NotificationBus::complete(self, key, event);
    }
}
