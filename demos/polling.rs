//! Polls a process-scoped orchestrator the way a REST endpoint would.
//!
//! The providers run with `notify = false` (no push), so progress is only
//! visible through `snapshot()`. After the run settles the orchestrator is
//! reset, demonstrating the re-arm contract.
//!
//! Run with: `cargo run --example polling --features demo`

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tributary::{NotificationBus, Notify, Orchestrator, ProviderSpec, RandomProducer, ResultCache, Snapshot};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // No subscribers ever register: the bus discards every push, which is
    // exactly what polling mode wants.
    let bus = Arc::new(NotificationBus::new());
    let cache = Arc::new(ResultCache::new());

    let specs = vec![
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 1")),
            Duration::from_secs(1),
            false,
        ),
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 2")),
            Duration::from_secs(2),
            false,
        ),
        ProviderSpec::new(
            Arc::new(RandomProducer::new("Provider 3")),
            Duration::from_secs(4),
            false,
        ),
    ];
    let orchestrator = Arc::new(Orchestrator::new(
        "polling",
        specs,
        cache,
        Arc::clone(&bus) as Arc<dyn Notify<Snapshot>>,
    ));

    tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            if let Err(err) = orchestrator.start(CancellationToken::new()).await {
                eprintln!("orchestrator failed: {err}");
            }
        }
    });

    loop {
        let snap = orchestrator.snapshot();
        println!("{}", serde_json::to_string(&snap)?);
        if !snap.is_in_progress() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    orchestrator.reset();
    println!("after reset: {}", serde_json::to_string(&orchestrator.snapshot())?);
    Ok(())
}
