//! Data-mart replicator binary.
//!
//! Wires an in-memory change-event consumer, a lock-gated scheduler, and
//! the JSON projection together into a short demo run: drain whatever
//! events are queued, project each one against the `entities` table, and
//! log the resulting row. There is no real message broker or database
//! connection here — those are the external collaborators spec.md 6 names,
//! not part of this crate's contract.

mod config;
mod demo;

use config::ReplicatorConfig;
use martlock_locking::ProcessScopeLockingService;
use martlock_scheduler::{SchedulerConfig, SchedulingService};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = ReplicatorConfig::from_env();
    init_logging(&config);

    info!(wait_ms = ?config.lock_wait_ms, "starting martlock-replicator");

    let scheduler = SchedulingService::new(
        Box::new(ProcessScopeLockingService::new()),
        SchedulerConfig::from_env(),
    );
    scheduler.init().expect("scheduler init must succeed on a fresh service");

    demo::run(&scheduler);

    scheduler.shutdown();
    info!("martlock-replicator shut down cleanly");
}

fn init_logging(config: &ReplicatorConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
