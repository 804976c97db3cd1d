//! # Producer abstraction.
//!
//! This module defines the [`Produce`] trait, the seam between the runtime
//! and concrete data sources. A producer has a stable name and an async
//! [`fetch`](Produce::fetch) that receives a [`CancellationToken`]; its
//! internals (network call, database query, random generation) are irrelevant
//! to the runtime.
//!
//! The common handle type is [`ProducerRef`], an `Arc<dyn Produce>` suitable
//! for sharing across the runtime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProduceError;
use crate::records::Record;

/// Shared reference to a producer (`Arc<dyn Produce>`).
pub type ProducerRef = Arc<dyn Produce>;

/// # Asynchronous, cancelable data source.
///
/// A `Produce` implementation has a stable [`name`](Produce::name) — unique
/// within one orchestrator — and an async [`fetch`](Produce::fetch) invoked
/// once per provider run, after the declared latency elapses.
///
/// Implementations observing cancellation should return
/// [`ProduceError::Canceled`]; the task boundary treats it as a graceful
/// abort, not a failure.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use tributary::{Produce, ProduceError, Record};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Produce for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn fetch(&self, ctx: CancellationToken) -> Result<Vec<Record>, ProduceError> {
///         if ctx.is_cancelled() {
///             return Err(ProduceError::Canceled);
///         }
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait Produce: Send + Sync + 'static {
    /// Returns the stable, human-readable producer name.
    fn name(&self) -> &str;

    /// Fetches one batch of records.
    ///
    /// Any error is absorbed at the provider task boundary and turned into a
    /// `Failed` event carrying the error text.
    async fn fetch(&self, ctx: CancellationToken) -> Result<Vec<Record>, ProduceError>;
}
