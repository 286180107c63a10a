//! `/start`, `/status`, `/next`, `/done` — the dispatch protocol's run
//! surface (`spec.md` §4.2, §6).

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use scheduler_core::metrics::Summary;
use scheduler_core::ScheduleError;

use crate::error::AppError;
use crate::run::{DoneOutcome, DoneReport, NextOutcome, StartRequest, StatusOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartBody {
    pub dataset_file: String,
    pub speedup: f64,
    pub min_slots: u32,
    #[serde(default)]
    pub quantum_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub run_id: String,
}

/// `POST /start` — admits a new run, replacing any previous one. 400 on
/// insufficient slots or a missing/malformed dataset.
pub async fn start(
    Extension(state): Extension<AppState>,
    Json(body): Json<StartBody>,
) -> Result<Json<StartResponse>, AppError> {
    let total_alive_slots = state.registry.total_alive_slots();
    let req = StartRequest {
        dataset_file: body.dataset_file,
        speedup: body.speedup,
        min_slots: body.min_slots,
        quantum_ms: body.quantum_ms,
        discipline: state.discipline,
    };
    let run_id = state.engine.start(req, total_alive_slots)?;
    tracing::info!(run_id = %run_id, discipline = ?state.discipline, "run started");
    Ok(Json(StartResponse { run_id }))
}

/// `GET /status` — never errors; `no_run`/`running`/`done` are all 200s.
pub async fn status(Extension(state): Extension<AppState>) -> Json<Value> {
    let body = match state.engine.status() {
        StatusOutcome::NoRun => json!({"status": "no_run"}),
        StatusOutcome::Running {
            completed,
            total,
            ready_len,
            pending_len,
        } => json!({
            "status": "running",
            "completed": completed,
            "total": total,
            "ready": ready_len,
            "pending": pending_len,
        }),
        StatusOutcome::Done {
            run_id,
            summary,
            jobs_csv,
            run_csv,
        } => json!({
            "status": "done",
            "run_id": run_id,
            "summary": summary_json(&summary),
            "jobs_csv": jobs_csv,
            "run_csv": run_csv,
        }),
    };
    Json(body)
}

fn summary_json(summary: &Summary) -> Value {
    serde_json::to_value(summary).unwrap_or(Value::Null)
}

#[derive(Debug, Deserialize)]
pub struct NextBody {
    pub worker_id: String,
    pub core_id: u32,
    pub timeout_ms: u64,
}

/// `POST /next` — long-poll dispatch. Liveness is checked before the
/// (blocking) wait, never inside it.
pub async fn next(
    Extension(state): Extension<AppState>,
    Json(body): Json<NextBody>,
) -> Result<Json<Value>, AppError> {
    state.registry.check_alive(&body.worker_id, body.core_id)?;

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.next(&body.worker_id, body.core_id, body.timeout_ms)
    })
    .await
    .map_err(|e| AppError(ScheduleError::Internal(e.into())))?;

    let body = match outcome {
        NextOutcome::Ok(info) => json!({
            "status": "ok",
            "job_id": info.job_id,
            "execution_ms": info.execution_ms,
            "slice_ms": info.slice_ms,
            "remaining_before_ms": info.remaining_ms,
            "priority": info.priority,
            "arrival_ms": info.arrival_ms,
        }),
        NextOutcome::Wait => json!({"status": "wait"}),
        NextOutcome::NoRun => json!({"status": "no_run"}),
        NextOutcome::Done => json!({"status": "done"}),
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct DoneBody {
    pub worker_id: String,
    pub core_id: u32,
    pub job_id: String,
    pub started_wall_ms: i64,
    pub finished_wall_ms: i64,
    #[serde(default)]
    pub ran_ms: Option<u64>,
    #[serde(default)]
    pub remaining_after_ms: Option<u64>,
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_mb: Option<f64>,
}

/// `POST /done` — required exactly once per dispatched job/slice. Tolerates
/// replay against an already-completed job (`spec.md` §4.3).
pub async fn done(
    Extension(state): Extension<AppState>,
    Json(body): Json<DoneBody>,
) -> Result<Json<Value>, AppError> {
    state.registry.check_alive(&body.worker_id, body.core_id)?;

    let _ = body.ran_ms; // advisory only; the engine recomputes from wall timestamps
    let report = DoneReport {
        worker_id: body.worker_id,
        core_id: body.core_id,
        job_id: body.job_id,
        started_wall_ms: body.started_wall_ms,
        finished_wall_ms: body.finished_wall_ms,
        remaining_after_ms: body.remaining_after_ms,
        cpu_percent: body.cpu_percent,
        memory_mb: body.memory_mb,
    };

    // Queried before the engine's lock, same as `/start`'s admission check —
    // the summary CSV's `total_slots_at_end` reflects whatever's alive at
    // the moment finalization happens to run (`spec.md` §6).
    let total_alive_slots = state.registry.total_alive_slots();

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.done(report, total_alive_slots, None))
        .await
        .map_err(|e| AppError(ScheduleError::Internal(e.into())))??;

    let body = match outcome {
        DoneOutcome::Ok => json!({"status": "ok"}),
        DoneOutcome::NoRun => json!({"status": "no_run"}),
        DoneOutcome::Done => json!({"status": "done"}),
    };
    Ok(Json(body))
}
