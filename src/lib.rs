//! # tributary
//!
//! **Tributary** aggregates results from several independent, slow async data
//! sources and pushes incremental progress to live subscribers until every
//! source has finished. It is a building block for "search fans out to N
//! suppliers, the client watches results stream in" backends, independent of
//! the transport that carries the push.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ProviderSpec │   │ ProviderSpec │   │ ProviderSpec │
//!     │ (supplier 1) │   │ (supplier 2) │   │ (supplier N) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Orchestrator (one per session)                               │
//! │  - ResultCache (batches + completion set)                     │
//! │  - EventChannel (provider lifecycle events, FIFO)             │
//! │  - drain loop: terminal event → Snapshot → Notify             │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  NotificationBus (keyed pub/sub, one instance per process)    │
//! │      key ──► [queue S1] ─► Subscription loop ─► EventSink S1  │
//! │          ──► [queue S2] ─► Subscription loop ─► EventSink S2  │
//! │               (heartbeats, lifetime ceiling, capacity cap)    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! session opens ──► NotificationBus::subscribe(key, sink, token)
//!                   Orchestrator::start(token)
//!
//! start:
//!   ├─► announce initial snapshot (count=0, inProgress=true)
//!   ├─► spawn every ProviderTask          (unbounded parallelism)
//!   │     ├─► publish Started
//!   │     ├─► sleep latency               (cancellation point)
//!   │     ├─► producer.fetch()
//!   │     ├─ Ok  ──► cache.add_result ──► publish Completed
//!   │     └─ Err ──► cache.mark_failed ─► publish Failed
//!   ├─► drain loop: each Completed/Failed → announce snapshot
//!   ├─► join all ──► channel.complete() ──► drain ends
//!   └─► announce final snapshot ──► bus complete ("finished")
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                     |
//! |-------------------|----------------------------------------------------------------|----------------------------------------|
//! | **Producers**     | Define data sources as trait impls or plain closures.          | [`Produce`], [`ProducerFn`], [`ProviderSpec`] |
//! | **Aggregation**   | Shared batch cache with completion tracking.                   | [`ResultCache`], [`Snapshot`], [`Record`] |
//! | **Orchestration** | Fan-out/fan-in run cycle with per-session cancellation.        | [`Orchestrator`]                       |
//! | **Push**          | Keyed fan-out with heartbeats and per-subscriber isolation.    | [`NotificationBus`], [`Notify`]        |
//! | **Transport**     | Bring your own sink; SSE framing included.                     | [`EventSink`], [`SseWriter`]           |
//! | **Errors**        | Typed errors per absorption boundary.                          | [`NotifyError`], [`OrchestrateError`]  |
//!
//! ## Optional features
//! - `demo`: exports [`RandomProducer`], a faker-style data source
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use tributary::{
//!     NotificationBus, Notify, Orchestrator, ProduceError, ProducerFn, ProducerRef,
//!     ProviderSpec, Record, ResultCache, Snapshot, SseWriter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(NotificationBus::new());
//!     let cache = Arc::new(ResultCache::new());
//!
//!     let supplier: ProducerRef = ProducerFn::arc("supplier-a", |_ctx: CancellationToken| async {
//!         // real implementations call out to a slow upstream here
//!         Ok::<Vec<Record>, ProduceError>(Vec::new())
//!     });
//!     let specs = vec![ProviderSpec::new(supplier, Duration::from_secs(2), true)];
//!
//!     let orchestrator = Arc::new(Orchestrator::new(
//!         "session-1",
//!         specs,
//!         cache,
//!         Arc::clone(&bus) as Arc<dyn Notify<Snapshot>>,
//!     ));
//!
//!     let token = CancellationToken::new();
//!     tokio::spawn({
//!         let orchestrator = Arc::clone(&orchestrator);
//!         let token = token.clone();
//!         async move { orchestrator.start(token).await }
//!     });
//!
//!     // Blocks until the orchestrator completes the session (or the token
//!     // is cancelled / the lifetime ceiling elapses).
//!     bus.subscribe("session-1", SseWriter::new(tokio::io::stdout()), token)
//!         .await?;
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod events;
mod notify;
mod orchestrator;
mod providers;
mod records;

// ---- Public re-exports ----

pub use cache::ResultCache;
pub use config::NotifyConfig;
pub use error::{ChannelClosed, NotifyError, OrchestrateError, ProduceError};
pub use events::{EventChannel, EventKind, ProviderEvent};
pub use notify::{EventSink, NotificationBus, Notify, SseWriter};
pub use orchestrator::{Orchestrator, RunState, SNAPSHOT_EVENT};
pub use providers::{Produce, ProducerFn, ProducerRef, ProviderSpec, ProviderTask};
pub use records::{Record, Snapshot};

// Optional: expose the faker-style demo producer.
// Enable with: `--features demo`
#[cfg(feature = "demo")]
pub use providers::RandomProducer;
