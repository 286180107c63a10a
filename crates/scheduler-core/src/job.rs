//! Job identity, timing state, and the CSV row shape jobs are admitted from.

use serde::{Deserialize, Serialize};

/// One row of the input dataset CSV. `priority` and `arrival_time_ms` are
/// optional columns — `priority` defaults to `1`, `arrival_time_ms` to `0`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub service_time_ms: u64,
    #[serde(default)]
    pub arrival_time_ms: u64,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    1
}

/// A job's admission sequence number. Assigned the moment a job first enters
/// any set (ready or pending) — used as the final priority tie-break.
pub type Sequence = u64;

/// A job under execution by the run engine.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: String,
    pub service_ms: u64,
    pub arrival_ms: u64,
    pub priority: i64,
    pub sequence: Sequence,

    pub start_ms: Option<u64>,
    pub finish_ms: Option<u64>,

    /// Round-robin only: remaining simulated work, decremented per slice.
    pub remaining_ms: u64,
    pub slices: u32,
    pub preemptions: u32,

    pub cpu_percent: Option<f64>,
    pub memory_mb: Option<f64>,
}

impl Job {
    pub fn new(record: JobRecord, sequence: Sequence) -> Self {
        Self {
            job_id: record.job_id,
            service_ms: record.service_time_ms,
            arrival_ms: record.arrival_time_ms,
            priority: record.priority,
            sequence,
            start_ms: None,
            finish_ms: None,
            remaining_ms: record.service_time_ms,
            slices: 0,
            preemptions: 0,
            cpu_percent: None,
            memory_mb: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.finish_ms.is_some()
    }

    /// waiting = start - arrival; only meaningful once started.
    pub fn waiting_ms(&self) -> Option<u64> {
        self.start_ms.map(|s| s.saturating_sub(self.arrival_ms))
    }

    /// execution = finish - start.
    pub fn execution_ms(&self) -> Option<u64> {
        match (self.start_ms, self.finish_ms) {
            (Some(s), Some(f)) => Some(f.saturating_sub(s)),
            _ => None,
        }
    }

    /// response = finish - arrival.
    pub fn response_ms(&self) -> Option<u64> {
        self.finish_ms.map(|f| f.saturating_sub(self.arrival_ms))
    }

    /// slowdown = response / max(1, service).
    pub fn slowdown(&self) -> Option<f64> {
        self.response_ms()
            .map(|r| r as f64 / self.service_ms.max(1) as f64)
    }
}
