//! Aggregation core: fan-out providers, fan-in results, announce progress.
//!
//! The only public API from this module is [`Orchestrator`] plus its
//! lifecycle state. See `core` for the run-cycle wiring diagram.

mod core;

pub use core::{Orchestrator, RunState, SNAPSHOT_EVENT};
