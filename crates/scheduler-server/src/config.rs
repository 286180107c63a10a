//! Environment-driven configuration, read once at startup: `std::env::var`,
//! defaults applied with `.unwrap_or_else`, required variables `.expect()`-ed
//! with a message naming the variable.

use std::time::Duration;

use scheduler_core::Discipline;

pub struct ServerConfig {
    pub bind_addr: String,
    pub data_dir: std::path::PathBuf,
    pub results_dir: std::path::PathBuf,
    pub worker_timeout: Duration,
    /// Which discipline this scheduler instance runs. The original deploys
    /// one binary per discipline (`fifo/`, `priority/`, `round-robin/`); this
    /// rewrite collapses them into one binary configured by discipline
    /// instead, same idea as the teacher selecting behavior from env rather
    /// than from separate crates where the logic is otherwise identical.
    pub discipline: Discipline,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "/data".into());
        let results_dir = std::env::var("RESULTS_DIR").unwrap_or_else(|_| "/results".into());
        let worker_timeout_sec: u64 = std::env::var("WORKER_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let discipline = std::env::var("SCHEDULER_DISCIPLINE")
            .ok()
            .and_then(|v| parse_discipline(&v))
            .unwrap_or(Discipline::Fifo);

        Self {
            bind_addr,
            data_dir: data_dir.into(),
            results_dir: results_dir.into(),
            worker_timeout: Duration::from_secs(worker_timeout_sec),
            discipline,
        }
    }
}

fn parse_discipline(raw: &str) -> Option<Discipline> {
    match raw.to_ascii_lowercase().as_str() {
        "fifo" => Some(Discipline::Fifo),
        "priority" => Some(Discipline::Priority),
        "round_robin" | "round-robin" | "rr" => Some(Discipline::RoundRobin),
        _ => None,
    }
}
