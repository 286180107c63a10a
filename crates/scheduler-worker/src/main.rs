//! worker — standalone process exposing a fixed number of execution cores
//! to one Scheduler (`spec.md` §4.3, `SPEC_FULL.md` §9).
//!
//! Reads config from env vars:
//!   SCHEDULER_URL   — scheduler base URL (default: http://scheduler-svc:8000)
//!   WORKER_ID       — defaults to $HOSTNAME, then "worker-unknown"
//!   CORES           — execution slots (default: 4)
//!   SPEEDUP         — simulation acceleration factor (default: 20000.0)
//!   HEARTBEAT_SEC   — heartbeat interval in seconds (default: 2.0)

use std::time::Duration;

use scheduler_worker::client::SchedulerClient;
use scheduler_worker::config::WorkerConfig;
use scheduler_worker::{core_loop, heartbeat};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scheduler_worker=debug".into()),
        )
        .init();

    let config = WorkerConfig::from_env();
    let client = SchedulerClient::new(&config.scheduler_url);

    tracing::info!(
        worker_id = %config.worker_id,
        cores = config.cores,
        scheduler_url = %config.scheduler_url,
        speedup = config.speedup,
        "worker starting"
    );

    loop {
        match client.register(&config.worker_id, config.cores).await {
            Ok(resp) if resp.ok => break,
            Ok(_) => {
                tracing::warn!("register returned ok=false, retrying");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "register failed, retrying");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
    tracing::info!(worker_id = %config.worker_id, cores = config.cores, "registered with scheduler");

    let mut tasks = tokio::task::JoinSet::new();

    {
        let client = SchedulerClient::new(&config.scheduler_url);
        let worker_id = config.worker_id.clone();
        let interval = config.heartbeat_interval;
        tasks.spawn(async move {
            heartbeat::run_heartbeat(&client, &worker_id, interval).await;
        });
    }

    for core_id in 0..config.cores {
        let client = SchedulerClient::new(&config.scheduler_url);
        let worker_id = config.worker_id.clone();
        let speedup = config.speedup;
        tasks.spawn(async move {
            core_loop::run_core(&client, &worker_id, core_id, speedup).await;
        });
    }

    while tasks.join_next().await.is_some() {}
}
