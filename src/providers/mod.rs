//! # Producer abstractions and per-run execution.
//!
//! This module provides the producer-facing types:
//! - [`Produce`] — trait for implementing async cancelable data sources
//! - [`ProducerFn`] — function-backed producer implementation
//! - [`ProducerRef`] — shared reference to a producer (`Arc<dyn Produce>`)
//! - [`ProviderSpec`] — static descriptor (producer, latency, notify flag)
//! - [`ProviderTask`] — one producer run reporting lifecycle events

mod produce;
mod producer_fn;
mod spec;
mod task;

#[cfg(feature = "demo")]
mod random;

pub use produce::{Produce, ProducerRef};
pub use producer_fn::ProducerFn;
pub use spec::ProviderSpec;
pub use task::ProviderTask;

#[cfg(feature = "demo")]
pub use random::RandomProducer;
