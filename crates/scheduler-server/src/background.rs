//! Background tasks tied to the process, not to any one run: arrivals
//! promotion and lost-job reclamation. Follows the `OutboxDispatcher::run`
//! shape — a `loop { ...; sleep(interval).await }` spawned once from
//! `main` via `tokio::spawn`.

use std::sync::Arc;
use std::time::Duration;

use crate::registry::WorkerRegistry;
use crate::run::RunEngine;

/// Promotes pending arrivals into the ready set roughly every 10ms
/// wall-clock. Never exits.
pub async fn arrivals_promotion_loop(engine: Arc<RunEngine>) {
    let mut ticker = tokio::time::interval(Duration::from_millis(10));
    loop {
        ticker.tick().await;
        let engine = Arc::clone(&engine);
        let promoted = tokio::task::spawn_blocking(move || engine.promote_arrivals())
            .await
            .unwrap_or(0);
        if promoted > 0 {
            tracing::debug!(promoted, "promoted pending arrivals");
        }
    }
}

/// Periodically returns jobs in flight on a now-dead (worker, core) to the
/// ready set. Runs less often than arrivals promotion — liveness only
/// changes on the `WORKER_TIMEOUT_SEC` timescale.
pub async fn reclaim_lost_loop(engine: Arc<RunEngine>, registry: Arc<WorkerRegistry>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let engine = Arc::clone(&engine);
        let registry = Arc::clone(&registry);
        let reclaimed =
            tokio::task::spawn_blocking(move || engine.reclaim_lost(&registry))
                .await
                .unwrap_or(0);
        if reclaimed > 0 {
            tracing::warn!(reclaimed, "reclaimed jobs from dead workers");
        }
    }
}
