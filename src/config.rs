//! # Notification bus configuration.
//!
//! [`NotifyConfig`] defines the per-key subscriber capacity, the heartbeat
//! cadence, and the absolute lifetime ceiling applied to every subscription.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use tributary::NotifyConfig;
//!
//! let mut cfg = NotifyConfig::default();
//! cfg.heartbeat_interval = Duration::from_secs(30);
//!
//! assert_eq!(cfg.max_subscribers_per_key, 10);
//! ```

use std::time::Duration;

/// Tunables for the [`NotificationBus`](crate::NotificationBus).
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    /// Maximum concurrent subscribers per topic key; further subscriptions
    /// are rejected with a capacity error. Values below 1 are clamped to 1.
    pub max_subscribers_per_key: usize,
    /// Interval between synthetic heartbeat events written directly to each
    /// subscriber's sink to keep the transport alive.
    pub heartbeat_interval: Duration,
    /// Absolute ceiling on a subscription's lifetime, regardless of activity.
    /// Bounds resource retention from abandoned connections.
    pub subscription_lifetime: Duration,
}

impl Default for NotifyConfig {
    /// Provides a default configuration:
    /// - `max_subscribers_per_key = 10`
    /// - `heartbeat_interval = 15s`
    /// - `subscription_lifetime = 10min`
    fn default() -> Self {
        Self {
            max_subscribers_per_key: 10,
            heartbeat_interval: Duration::from_secs(15),
            subscription_lifetime: Duration::from_secs(600),
        }
    }
}
