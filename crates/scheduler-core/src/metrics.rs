//! Per-run summary statistics computed at finalization.

use serde::Serialize;

use crate::job::Job;

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub jobs: usize,
    pub mean_response_ms: f64,
    pub p50_response_ms: f64,
    pub p95_response_ms: f64,
    pub p99_response_ms: f64,
    pub mean_wait_ms: f64,
    /// Non-preemptive disciplines: mean execution time. Round robin:
    /// average slices dispatched per job instead (`spec.md` §6).
    pub mean_execution_ms: Option<f64>,
    pub avg_slices_per_job: Option<f64>,
}

/// Computes the summary over a completed run's jobs. Every job must have
/// `finish_ms` set — callers only invoke this after `completed == total`.
pub fn summarize(jobs: &[Job], round_robin: bool) -> Summary {
    let mut responses: Vec<f64> = jobs.iter().filter_map(|j| j.response_ms()).map(|r| r as f64).collect();
    responses.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mean_response_ms = mean(&responses);
    let mean_wait_ms = mean(
        &jobs
            .iter()
            .filter_map(|j| j.waiting_ms())
            .map(|w| w as f64)
            .collect::<Vec<_>>(),
    );

    let (mean_execution_ms, avg_slices_per_job) = if round_robin {
        let total_slices: u32 = jobs.iter().map(|j| j.slices).sum();
        (None, Some(total_slices as f64 / jobs.len().max(1) as f64))
    } else {
        let executions: Vec<f64> = jobs
            .iter()
            .filter_map(|j| j.execution_ms())
            .map(|e| e as f64)
            .collect();
        (Some(mean(&executions)), None)
    };

    Summary {
        jobs: jobs.len(),
        mean_response_ms,
        p50_response_ms: percentile(&responses, 0.50),
        p95_response_ms: percentile(&responses, 0.95),
        p99_response_ms: percentile(&responses, 0.99),
        mean_wait_ms,
        mean_execution_ms,
        avg_slices_per_job,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Nearest-rank percentile over an already-sorted ascending slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobRecord;

    fn completed_job(job_id: &str, arrival: u64, service: u64, start: u64, finish: u64) -> Job {
        let mut job = Job::new(
            JobRecord {
                job_id: job_id.into(),
                service_time_ms: service,
                arrival_time_ms: arrival,
                priority: 1,
            },
            0,
        );
        job.start_ms = Some(start);
        job.finish_ms = Some(finish);
        job
    }

    #[test]
    fn percentiles_are_ordered() {
        let jobs = vec![
            completed_job("A", 0, 100, 0, 100),
            completed_job("B", 0, 100, 100, 300),
            completed_job("C", 0, 100, 300, 700),
            completed_job("D", 0, 100, 700, 1_500),
        ];
        let summary = summarize(&jobs, false);
        assert!(summary.p50_response_ms <= summary.p95_response_ms);
        assert!(summary.p95_response_ms <= summary.p99_response_ms);
        assert_eq!(summary.jobs, 4);
    }

    #[test]
    fn round_robin_reports_avg_slices_not_mean_execution() {
        let mut job = completed_job("A", 0, 50, 0, 80);
        job.slices = 3;
        let summary = summarize(&[job], true);
        assert!(summary.mean_execution_ms.is_none());
        assert_eq!(summary.avg_slices_per_job, Some(3.0));
    }
}
