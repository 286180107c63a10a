//! Env-var-driven worker configuration, matching `SCHEDULER_URL`/`WORKER_ID`/
//! `CORES`/`SPEEDUP`/`HEARTBEAT_SEC` from `spec.md` §6, read the same way
//! `sem_os_server::main` reads its `SEM_OS_*` variables.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub scheduler_url: String,
    pub worker_id: String,
    pub cores: u32,
    pub speedup: f64,
    pub heartbeat_interval: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let worker_id = std::env::var("WORKER_ID")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "worker-unknown".to_string());

        let cores = std::env::var("CORES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        let speedup = std::env::var("SPEEDUP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20_000.0);

        let heartbeat_sec = std::env::var("HEARTBEAT_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2.0_f64);

        Self {
            scheduler_url: std::env::var("SCHEDULER_URL")
                .unwrap_or_else(|_| "http://scheduler-svc:8000".to_string()),
            worker_id,
            cores,
            speedup,
            heartbeat_interval: Duration::from_secs_f64(heartbeat_sec),
        }
    }
}
