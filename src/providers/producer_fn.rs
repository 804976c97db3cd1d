//! # Function-backed producer (`ProducerFn`).
//!
//! [`ProducerFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`,
//! producing a fresh future per fetch. No shared mutable state between runs;
//! if a producer needs shared state, capture an `Arc<...>` explicitly inside
//! the closure.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProduceError;
use crate::records::Record;

use super::produce::Produce;

/// Function-backed producer implementation.
///
/// Wraps a closure that *creates* a new future per fetch.
///
/// ## Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use tributary::{Produce, ProducerFn, ProducerRef, ProduceError, Record};
///
/// let p: ProducerRef = ProducerFn::arc("supplier", |_ctx: CancellationToken| async {
///     Ok::<Vec<Record>, ProduceError>(Vec::new())
/// });
/// assert_eq!(p.name(), "supplier");
/// ```
#[derive(Debug)]
pub struct ProducerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProducerFn<F> {
    /// Creates a new function-backed producer.
    ///
    /// Prefer [`ProducerFn::arc`] when you immediately need a [`ProducerRef`](super::ProducerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the producer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Produce for ProducerFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Vec<Record>, ProduceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, ctx: CancellationToken) -> Result<Vec<Record>, ProduceError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_fetch_runs_closure() {
        let p = ProducerFn::new("one", |_ctx: CancellationToken| async {
            Ok::<_, ProduceError>(vec![Record::new(1, "one", 5.0, Utc::now())])
        });

        let records = p.fetch(CancellationToken::new()).await.expect("closure returns Ok");
        assert_eq!(records.len(), 1);
        assert_eq!(p.name(), "one");
    }
}
