//! # Orchestrator: fan-out, aggregate, announce.
//!
//! The [`Orchestrator`] owns a result cache, a set of provider specs, and an
//! event channel. One instance serves one session's stream, or acts as
//! long-lived process state for polling callers (see [`Orchestrator::reset`]).
//!
//! ## High-level architecture
//! ```text
//! start(token):
//!   announce initial snapshot
//!        │
//!   spawn ProviderTask per spec ──► JoinSet      (unbounded parallelism,
//!        │                                        child token per provider)
//!        │            publish(ProviderEvent)
//!        │                   │
//!        │                   ▼
//!        │            EventChannel ──► drain loop:
//!        │                              Started          → log only
//!        │                              Completed/Failed → announce snapshot
//!        │
//!   join all providers ─► channel.complete() ─► drain ends after buffered
//!        │                                      events
//!        ▼
//!   announce final snapshot ─► notifier.complete(session)
//! ```
//!
//! ## Rules
//! - `start()` is idempotent: a second call observes `Running`/`Completed`
//!   and returns immediately.
//! - One provider's failure never aborts the others; a failed provider counts
//!   toward completion without contributing records.
//! - Cancellation counts as "finished" for the join step; the run still
//!   reaches `Completed` and emits its final snapshot.
//! - Snapshot emission order is the FIFO order of terminal events in the
//!   channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cache::ResultCache;
use crate::error::{ChannelClosed, OrchestrateError};
use crate::events::{EventChannel, EventKind};
use crate::notify::Notify;
use crate::providers::{ProviderSpec, ProviderTask};
use crate::records::Snapshot;

/// Event name used for snapshot pushes and the terminal completion event.
pub const SNAPSHOT_EVENT: &str = "availability-update";

/// Lifecycle state of an orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// `start()` has not been called since construction (or the last reset).
    NotStarted,
    /// A run is in flight.
    Running,
    /// The run finished; terminal.
    Completed,
}

struct Shared {
    state: RunState,
    channel: Arc<EventChannel>,
}

/// Runs N providers concurrently and pushes a progress snapshot after every
/// provider completion.
pub struct Orchestrator {
    session: String,
    specs: Vec<ProviderSpec>,
    cache: Arc<ResultCache>,
    notifier: Arc<dyn Notify<Snapshot>>,
    shared: Mutex<Shared>,
}

impl Orchestrator {
    /// Creates an orchestrator for `session` over the given provider specs.
    ///
    /// The cache is passed in rather than created so the owning scope (a
    /// session, or the process for polling mode) can keep a handle to it.
    pub fn new(
        session: impl Into<String>,
        specs: Vec<ProviderSpec>,
        cache: Arc<ResultCache>,
        notifier: Arc<dyn Notify<Snapshot>>,
    ) -> Self {
        Self {
            session: session.into(),
            specs,
            cache,
            notifier,
            shared: Mutex::new(Shared {
                state: RunState::NotStarted,
                channel: Arc::new(EventChannel::new()),
            }),
        }
    }

    /// The session key this orchestrator announces under.
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs all providers to completion, announcing snapshots along the way.
    ///
    /// No-op if a run is already in flight or finished. Blocks until every
    /// provider finished (success, failure, or cancellation), then emits the
    /// final snapshot and the terminal bus event.
    ///
    /// ### Errors
    /// [`OrchestrateError::ChannelClosed`] if an event publish hit a closed
    /// channel — a lifecycle bug, not a runtime condition.
    pub async fn start(&self, token: CancellationToken) -> Result<(), OrchestrateError> {
        let channel = {
            let mut shared = self.lock();
            if shared.state != RunState::NotStarted {
                tracing::debug!(session = %self.session, state = ?shared.state, "start ignored");
                return Ok(());
            }
            shared.state = RunState::Running;
            Arc::clone(&shared.channel)
        };
        tracing::info!(
            session = %self.session,
            providers = self.specs.len(),
            "orchestrator starting"
        );

        // Covers the zero-elapsed-time case before any provider reports.
        self.announce().await;

        let Some(mut rx) = channel.subscribe() else {
            // The consumer was already taken: lifecycle bug in the caller.
            self.lock().state = RunState::Completed;
            return Err(ChannelClosed.into());
        };

        let mut set = JoinSet::new();
        for spec in &self.specs {
            let task = ProviderTask::new(
                spec.clone(),
                Arc::clone(&self.cache),
                Some(Arc::clone(&channel)),
            );
            set.spawn(task.run(token.child_token()));
        }

        let drain = async {
            while let Some(event) = rx.recv().await {
                match &event.kind {
                    EventKind::Started { expected_delay } => {
                        tracing::debug!(
                            session = %self.session,
                            provider = %event.name,
                            expected_delay = ?expected_delay,
                            "provider started"
                        );
                    }
                    EventKind::Completed { records } => {
                        tracing::debug!(
                            session = %self.session,
                            provider = %event.name,
                            count = records.len(),
                            done = self.cache.completed_count(),
                            total = self.specs.len(),
                            "provider completed"
                        );
                        self.announce().await;
                    }
                    EventKind::Failed { error } => {
                        tracing::warn!(
                            session = %self.session,
                            provider = %event.name,
                            error = %error,
                            "provider failed"
                        );
                        self.announce().await;
                    }
                }
            }
        };

        let join_all = async {
            let mut publish_result: Result<(), ChannelClosed> = Ok(());
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(closed)) => publish_result = Err(closed),
                    Err(err) => {
                        // A panicked provider still counts as finished.
                        tracing::warn!(session = %self.session, error = %err, "provider task panicked");
                    }
                }
            }
            channel.complete();
            publish_result
        };

        let ((), publish_result) = tokio::join!(drain, join_all);

        self.announce().await;
        self.notifier.complete(&self.session, SNAPSHOT_EVENT).await;
        self.lock().state = RunState::Completed;
        tracing::info!(session = %self.session, "orchestrator completed");

        publish_result.map_err(Into::into)
    }

    /// Non-blocking point-in-time read, usable at any state.
    ///
    /// Before `start()` this is an empty, in-progress snapshot (unless the
    /// provider list is empty). Polling callers use this instead of waiting
    /// for the full run.
    pub fn snapshot(&self) -> Snapshot {
        let in_progress = !self.cache.all_done(self.specs.iter().map(|s| s.name()));
        Snapshot::new(self.cache.get_all(), in_progress)
    }

    /// Re-arms a finished (or not yet started) orchestrator.
    ///
    /// Clears the result cache, resets the started flag, and installs a fresh
    /// event channel — all under one lock, so the reset is atomic relative to
    /// concurrent `start()` calls. This is the explicit `Reset()` contract of
    /// the process-scoped polling variant.
    pub fn reset(&self) {
        let mut shared = self.lock();
        shared.state = RunState::NotStarted;
        shared.channel = Arc::new(EventChannel::new());
        self.cache.clear();
        tracing::debug!(session = %self.session, "orchestrator reset");
    }

    async fn announce(&self) {
        let snapshot = self.snapshot();
        tracing::debug!(
            session = %self.session,
            count = snapshot.count(),
            in_progress = snapshot.is_in_progress(),
            "announcing snapshot"
        );
        self.notifier
            .notify(&self.session, SNAPSHOT_EVENT, &snapshot)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProduceError;
    use crate::providers::{ProducerFn, ProducerRef};
    use crate::records::Record;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingNotifier {
        snapshots: std::sync::Mutex<Vec<Snapshot>>,
        completed_keys: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn snapshots(&self) -> Vec<Snapshot> {
            self.snapshots.lock().expect("test lock").clone()
        }

        fn completed_keys(&self) -> Vec<String> {
            self.completed_keys.lock().expect("test lock").clone()
        }
    }

    #[async_trait]
    impl Notify<Snapshot> for RecordingNotifier {
        async fn notify(&self, _key: &str, _event: &str, payload: &Snapshot) {
            self.snapshots.lock().expect("test lock").push(payload.clone());
        }

        async fn complete(&self, key: &str, _event: &str) {
            self.completed_keys
                .lock()
                .expect("test lock")
                .push(key.to_string());
        }
    }

    fn fixed(name: &'static str, ids: &'static [u32]) -> ProducerRef {
        ProducerFn::arc(name, move |_ctx: CancellationToken| async move {
            let records: Vec<Record> = ids
                .iter()
                .map(|id| Record::new(*id, name, 42.0, Utc::now()))
                .collect();
            Ok::<_, ProduceError>(records)
        })
    }

    fn failing(name: &'static str) -> ProducerRef {
        ProducerFn::arc(name, |_ctx: CancellationToken| async {
            Err::<Vec<Record>, _>(ProduceError::fail("boom"))
        })
    }

    fn spec(producer: ProducerRef, latency_ms: u64) -> ProviderSpec {
        ProviderSpec::new(producer, Duration::from_millis(latency_ms), true)
    }

    fn orchestrator(
        specs: Vec<ProviderSpec>,
    ) -> (Orchestrator, Arc<ResultCache>, Arc<RecordingNotifier>) {
        let cache = Arc::new(ResultCache::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let orch = Orchestrator::new(
            "session-1",
            specs,
            Arc::clone(&cache),
            Arc::clone(&notifier) as Arc<dyn Notify<Snapshot>>,
        );
        (orch, cache, notifier)
    }

    #[tokio::test]
    async fn test_three_providers_aggregate_in_order() {
        let specs = vec![
            spec(fixed("p1", &[1, 2]), 20),
            spec(fixed("p2", &[3]), 70),
            spec(fixed("p3", &[4, 5, 6]), 120),
        ];
        let (orch, _cache, notifier) = orchestrator(specs);

        orch.start(CancellationToken::new())
            .await
            .expect("run succeeds");
        assert_eq!(orch.state(), RunState::Completed);

        let snapshots = notifier.snapshots();
        // Initial + one per completion + guaranteed final.
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[0].count(), 0);
        assert!(snapshots[0].is_in_progress());

        let last = snapshots.last().expect("final snapshot exists");
        assert!(!last.is_in_progress());
        assert_eq!(last.count(), 6);

        // Record order within one provider's batch is preserved.
        let p3_ids: Vec<u32> = last
            .availabilities()
            .iter()
            .filter(|r| r.provider == "p3")
            .map(|r| r.id)
            .collect();
        assert_eq!(p3_ids, vec![4, 5, 6]);

        // Counts only ever grow as providers report.
        let counts: Vec<usize> = snapshots.iter().map(|s| s.count()).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(notifier.completed_keys(), vec!["session-1".to_string()]);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (orch, _cache, notifier) = orchestrator(vec![spec(fixed("p1", &[1]), 10)]);

        orch.start(CancellationToken::new())
            .await
            .expect("first run succeeds");
        let after_first = notifier.snapshots().len();

        orch.start(CancellationToken::new())
            .await
            .expect("second start is a no-op");
        assert_eq!(notifier.snapshots().len(), after_first);
        assert_eq!(notifier.completed_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_provider_counts_toward_completion() {
        let specs = vec![spec(fixed("good", &[7]), 20), spec(failing("bad"), 40)];
        let (orch, _cache, notifier) = orchestrator(specs);

        orch.start(CancellationToken::new())
            .await
            .expect("a producer failure is not a run failure");

        let snapshots = notifier.snapshots();
        assert_eq!(snapshots.len(), 4);

        let last = snapshots.last().expect("final snapshot exists");
        assert!(!last.is_in_progress(), "failure counts as done");
        assert!(last.availabilities().iter().all(|r| r.provider == "good"));
        assert_eq!(last.count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_mid_wait_still_completes() {
        let specs = vec![
            spec(fixed("fast", &[1]), 10),
            spec(fixed("slow", &[2]), 5_000),
        ];
        let (orch, _cache, notifier) = orchestrator(specs);
        let orch = Arc::new(orch);
        let token = CancellationToken::new();

        let handle = {
            let orch = Arc::clone(&orch);
            let token = token.clone();
            tokio::spawn(async move { orch.start(token).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();

        handle
            .await
            .expect("start task joins")
            .expect("cancellation is not an error");
        assert_eq!(orch.state(), RunState::Completed);

        let snapshots = notifier.snapshots();
        // Initial + fast completion + final; the cancelled provider emitted
        // no terminal event.
        assert_eq!(snapshots.len(), 3);
        let last = snapshots.last().expect("final snapshot exists");
        assert!(last.availabilities().iter().all(|r| r.provider == "fast"));
        assert!(
            last.is_in_progress(),
            "the cancelled provider never reported"
        );
        assert_eq!(notifier.completed_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_provider_list() {
        let (orch, _cache, notifier) = orchestrator(Vec::new());

        orch.start(CancellationToken::new())
            .await
            .expect("empty run succeeds");

        let snapshots = notifier.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert!(!snapshots[0].is_in_progress(), "empty list is trivially done");
        assert_eq!(orch.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_snapshot_before_start_is_empty_in_progress() {
        let (orch, _cache, _notifier) = orchestrator(vec![spec(fixed("p1", &[1]), 10)]);

        let snap = orch.snapshot();
        assert_eq!(snap.count(), 0);
        assert!(snap.is_in_progress());
        assert_eq!(orch.state(), RunState::NotStarted);
    }

    #[tokio::test]
    async fn test_reset_rearms_for_a_second_run() {
        let (orch, _cache, notifier) = orchestrator(vec![spec(fixed("p1", &[1]), 10)]);

        orch.start(CancellationToken::new())
            .await
            .expect("first run succeeds");
        assert_eq!(orch.state(), RunState::Completed);

        orch.reset();
        assert_eq!(orch.state(), RunState::NotStarted);
        let snap = orch.snapshot();
        assert_eq!(snap.count(), 0);
        assert!(snap.is_in_progress());

        orch.start(CancellationToken::new())
            .await
            .expect("second run succeeds after reset");
        assert_eq!(orch.state(), RunState::Completed);
        assert!(!orch.snapshot().is_in_progress());
        assert_eq!(notifier.completed_keys().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_mid_run_unmarks_reported_providers() {
        let specs = vec![spec(fixed("p1", &[1]), 10), spec(fixed("p2", &[2]), 120)];
        let (orch, cache, notifier) = orchestrator(specs);
        let orch = Arc::new(orch);

        let handle = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.start(CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(60)).await;
        cache.clear(); // p1 already reported; its completion is wiped

        handle
            .await
            .expect("start task joins")
            .expect("run succeeds");

        let last = notifier.snapshots().last().cloned().expect("final snapshot");
        assert!(
            last.is_in_progress(),
            "p1's completion was cleared mid-run"
        );
        assert!(last.availabilities().iter().all(|r| r.provider == "p2"));
    }
}
