//! Streams one aggregation session as SSE frames to stdout.
//!
//! Three faker-style providers complete after 2s/5s/9s; each completion pushes
//! a growing snapshot through the notification bus. Diagnostics go to stderr
//! (`RUST_LOG=tributary=debug` to see them).
//!
//! Run with: `cargo run --example live_stream --features demo`

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tributary::{
    NotificationBus, Notify, Orchestrator, ProviderSpec, RandomProducer, ResultCache, Snapshot,
    SseWriter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let bus = Arc::new(NotificationBus::new());
    let cache = Arc::new(ResultCache::new());
    let session = uuid::Uuid::new_v4().to_string();

    let specs = vec![
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 1")),
            Duration::from_secs(2),
            true,
        ),
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 2")),
            Duration::from_secs(5),
            true,
        ),
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 3")),
            Duration::from_secs(9),
            true,
        ),
    ];
    let orchestrator = Arc::new(Orchestrator::new(
        session.clone(),
        specs,
        cache,
        Arc::clone(&bus) as Arc<dyn Notify<Snapshot>>,
    ));

    let token = CancellationToken::new();
    tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        let token = token.clone();
        async move {
            if let Err(err) = orchestrator.start(token).await {
                eprintln!("orchestrator failed: {err}");
            }
        }
    });

    // Returns once the orchestrator completes the session.
    bus.subscribe(&session, SseWriter::new(tokio::io::stdout()), token)
        .await?;
    Ok(())
}
