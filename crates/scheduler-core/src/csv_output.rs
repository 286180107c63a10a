//! Writes the two result CSV artifacts at finalization. Best-effort: a write
//! failure is returned to the caller, who logs it and leaves the run `done`
//! with no artifact paths rather than crashing (`spec.md` §5, §7).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::discipline::Discipline;
use crate::job::Job;
use crate::metrics::Summary;

/// Non-preemptive (FIFO/priority) per-job result row: `start_time_ms` names
/// the single dispatch's start. Round robin gets its own row shape below
/// because its column is named `first_start_time_ms` instead (`spec.md`
/// §6); a single writer emits one homogeneous row shape per file since
/// every job in a run shares the same discipline.
#[derive(Serialize)]
struct JobRow<'a> {
    run_id: &'a str,
    job_id: &'a str,
    service_time_ms: u64,
    arrival_time_ms: u64,
    start_time_ms: Option<u64>,
    finish_time_ms: Option<u64>,
    waiting_time_ms: Option<u64>,
    execution_time_ms: Option<u64>,
    response_time_ms: Option<u64>,
    slowdown: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu_usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_usage_mb: Option<f64>,
}

/// Round-robin per-job result row: `first_start_time_ms` in place of
/// `start_time_ms`, plus `quantum_ms`/`slices`/`preemptions`, mirroring
/// `original_source/round-robin/scheduler.py`'s writer.
#[derive(Serialize)]
struct RoundRobinJobRow<'a> {
    run_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantum_ms: Option<u64>,
    job_id: &'a str,
    service_time_ms: u64,
    arrival_time_ms: u64,
    first_start_time_ms: Option<u64>,
    finish_time_ms: Option<u64>,
    waiting_time_ms: Option<u64>,
    execution_time_ms: Option<u64>,
    response_time_ms: Option<u64>,
    slowdown: Option<f64>,
    slices: u32,
    preemptions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu_usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_usage_mb: Option<f64>,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    run_id: &'a str,
    dataset_file: &'a str,
    speedup: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantum_ms: Option<u64>,
    jobs: usize,
    mean_response_ms: f64,
    p50_response_ms: f64,
    p95_response_ms: f64,
    p99_response_ms: f64,
    mean_wait_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_execution_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avg_slices_per_job: Option<f64>,
    total_slots_at_end: u32,
}

pub struct Artifacts {
    pub jobs_csv: PathBuf,
    pub run_csv: PathBuf,
}

#[allow(clippy::too_many_arguments)]
pub fn write_artifacts(
    results_dir: &Path,
    run_id: &str,
    dataset_file: &str,
    speedup: f64,
    discipline: Discipline,
    quantum_ms: Option<u64>,
    jobs: &[Job],
    summary: &Summary,
    total_slots_at_end: u32,
) -> anyhow::Result<Artifacts> {
    std::fs::create_dir_all(results_dir)?;

    let jobs_csv = results_dir.join(format!("{run_id}_jobs.csv"));
    let mut writer = csv::Writer::from_path(&jobs_csv)?;
    let rr_quantum = if discipline.is_round_robin() {
        quantum_ms
    } else {
        None
    };
    if discipline.is_round_robin() {
        for job in jobs {
            writer.serialize(RoundRobinJobRow {
                run_id,
                quantum_ms: rr_quantum,
                job_id: &job.job_id,
                service_time_ms: job.service_ms,
                arrival_time_ms: job.arrival_ms,
                first_start_time_ms: job.start_ms,
                finish_time_ms: job.finish_ms,
                waiting_time_ms: job.waiting_ms(),
                execution_time_ms: job.execution_ms(),
                response_time_ms: job.response_ms(),
                slowdown: job.slowdown(),
                slices: job.slices,
                preemptions: job.preemptions,
                cpu_usage_percent: job.cpu_percent,
                memory_usage_mb: job.memory_mb,
            })?;
        }
    } else {
        for job in jobs {
            writer.serialize(JobRow {
                run_id,
                job_id: &job.job_id,
                service_time_ms: job.service_ms,
                arrival_time_ms: job.arrival_ms,
                start_time_ms: job.start_ms,
                finish_time_ms: job.finish_ms,
                waiting_time_ms: job.waiting_ms(),
                execution_time_ms: job.execution_ms(),
                response_time_ms: job.response_ms(),
                slowdown: job.slowdown(),
                priority: matches!(discipline, Discipline::Priority).then_some(job.priority),
                cpu_usage_percent: job.cpu_percent,
                memory_usage_mb: job.memory_mb,
            })?;
        }
    }
    writer.flush()?;

    let run_csv = results_dir.join(format!("{run_id}_summary.csv"));
    let mut writer = csv::Writer::from_path(&run_csv)?;
    writer.serialize(SummaryRow {
        run_id,
        dataset_file,
        speedup,
        quantum_ms: rr_quantum,
        jobs: summary.jobs,
        mean_response_ms: summary.mean_response_ms,
        p50_response_ms: summary.p50_response_ms,
        p95_response_ms: summary.p95_response_ms,
        p99_response_ms: summary.p99_response_ms,
        mean_wait_ms: summary.mean_wait_ms,
        mean_execution_ms: summary.mean_execution_ms,
        avg_slices_per_job: summary.avg_slices_per_job,
        total_slots_at_end,
    })?;
    writer.flush()?;

    Ok(Artifacts { jobs_csv, run_csv })
}
