//! `GET /health` — basic liveness, grounded on
//! `sem_os_server::handlers::health::health`.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
