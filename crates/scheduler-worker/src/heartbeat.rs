//! Periodic `/heartbeat`, grounded on `heartbeat_loop` in
//! `examples/original_source/fifo/worker.py`. Transport failures are
//! swallowed — a missed heartbeat just risks the worker being declared dead
//! a little early, not a crash.

use std::time::Duration;

use crate::client::SchedulerClient;

pub async fn run_heartbeat(client: &SchedulerClient, worker_id: &str, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        if let Err(e) = client.heartbeat(worker_id).await {
            tracing::warn!(error = %e, "heartbeat failed");
        }
    }
}
