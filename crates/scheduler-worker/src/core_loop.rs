//! One core = one driver task: long-poll `/next`, simulate the dispatched
//! unit of work by sleeping a speedup-scaled wall duration, report `/done`.
//! Grounded on `core_driver`/`core_thread` in
//! `examples/original_source/fifo/worker.py` and `round-robin/worker.py` —
//! collapsed into a single async task per core since there's no benefit to
//! a separate OS thread plus semaphore handoff once `/next` is itself
//! async.

use std::time::Duration;

use crate::client::{DoneRequest, NextResponse, SchedulerClient};
use crate::resources::ResourceSampler;

const NEXT_TIMEOUT_MS: u64 = 20_000;
const BACKOFF: Duration = Duration::from_millis(200);

pub async fn run_core(client: &SchedulerClient, worker_id: &str, core_id: u32, speedup: f64) {
    let mut sampler = ResourceSampler::new();
    loop {
        let next = match client.next(worker_id, core_id, NEXT_TIMEOUT_MS).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(core_id, error = %e, "next failed, backing off");
                tokio::time::sleep(BACKOFF).await;
                continue;
            }
        };

        match next {
            NextResponse::Ok {
                job_id,
                execution_ms,
                slice_ms,
                remaining_before_ms,
                ..
            } => {
                execute_dispatch(
                    client,
                    worker_id,
                    core_id,
                    speedup,
                    &mut sampler,
                    job_id,
                    execution_ms,
                    slice_ms,
                    remaining_before_ms,
                )
                .await;
            }
            NextResponse::Wait | NextResponse::NoRun | NextResponse::Done => {
                tokio::time::sleep(BACKOFF).await;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn execute_dispatch(
    client: &SchedulerClient,
    worker_id: &str,
    core_id: u32,
    speedup: f64,
    sampler: &mut ResourceSampler,
    job_id: String,
    execution_ms: Option<u64>,
    slice_ms: Option<u64>,
    remaining_before_ms: Option<u64>,
) {
    let unit_ms = execution_ms.or(slice_ms).unwrap_or(0);

    tracing::info!(core_id, job_id = %job_id, unit_ms, "job started");

    let before = sampler.sample();
    let started_wall_ms = chrono::Utc::now().timestamp_millis();

    let sleep_secs = (unit_ms as f64) / 1000.0 / speedup.max(1e-9);
    tokio::time::sleep(Duration::from_secs_f64(sleep_secs.max(0.0))).await;

    let finished_wall_ms = chrono::Utc::now().timestamp_millis();
    let after = sampler.sample();

    tracing::info!(core_id, job_id = %job_id, "job finished");

    let remaining_after_ms = slice_ms.map(|slice| remaining_before_ms.unwrap_or(slice).saturating_sub(slice));

    let report = DoneRequest {
        worker_id,
        core_id,
        job_id: &job_id,
        started_wall_ms,
        finished_wall_ms,
        ran_ms: Some(unit_ms),
        remaining_after_ms,
        cpu_percent: Some(crate::resources::average_cpu(&before, &after)),
        memory_mb: Some(crate::resources::peak_memory_mb(&before, &after)),
    };

    if let Err(e) = client.done(report).await {
        tracing::warn!(core_id, job_id = %job_id, error = %e, "done report failed, will not retry mid-loop");
    }
}
