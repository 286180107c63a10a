//! `/register`, `/heartbeat`, `/workers` — front the Worker Registry
//! (`spec.md` §4.1, §6).

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub worker_id: String,
    pub cores: u32,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub worker_id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct WorkersResponse {
    pub worker_count: usize,
    pub total_slots: u32,
    pub workers: Vec<crate::registry::WorkerSummary>,
}

/// `POST /register` — idempotent upsert, unknown workers are onboarded
/// implicitly.
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Json<OkResponse> {
    state.registry.register(&req.worker_id, req.cores);
    tracing::info!(worker_id = %req.worker_id, cores = req.cores, "worker registered");
    Json(OkResponse { ok: true })
}

/// `POST /heartbeat` — idempotent; `ok: false` if the worker was never
/// registered.
pub async fn heartbeat(
    Extension(state): Extension<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Json<OkResponse> {
    let ok = state.registry.heartbeat(&req.worker_id);
    Json(OkResponse { ok })
}

/// `GET /workers` — alive entries sorted by id, with total alive slots.
pub async fn workers(Extension(state): Extension<AppState>) -> Json<WorkersResponse> {
    let workers = state.registry.list_alive();
    let total_slots = workers.iter().map(|w| w.cores).sum();
    Json(WorkersResponse {
        worker_count: workers.len(),
        total_slots,
        workers,
    })
}
