//! scheduler — standalone scheduler process for the job-scheduling
//! simulator.
//!
//! Reads config from env vars (`spec.md` §6, `SPEC_FULL.md` §9):
//!   DATA_DIR             — dataset root (default: /data)
//!   RESULTS_DIR           — output CSV root (default: /results)
//!   WORKER_TIMEOUT_SEC    — liveness window in seconds (default: 10)
//!   SCHEDULER_DISCIPLINE  — fifo | priority | round_robin (default: fifo)
//!   BIND_ADDR             — listen address (default: 0.0.0.0:8000)

use std::sync::Arc;

use tokio::net::TcpListener;

use scheduler_server::background::{arrivals_promotion_loop, reclaim_lost_loop};
use scheduler_server::clock::SystemClock;
use scheduler_server::config::ServerConfig;
use scheduler_server::registry::WorkerRegistry;
use scheduler_server::router::build_router;
use scheduler_server::run::RunEngine;
use scheduler_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scheduler_server=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();

    let registry = Arc::new(WorkerRegistry::new(config.worker_timeout));
    let engine = Arc::new(RunEngine::new(
        config.data_dir.clone(),
        config.results_dir.clone(),
        Arc::new(SystemClock),
    ));

    tokio::spawn(arrivals_promotion_loop(Arc::clone(&engine)));
    tokio::spawn(reclaim_lost_loop(Arc::clone(&engine), Arc::clone(&registry)));

    let state = AppState {
        registry,
        engine,
        discipline: config.discipline,
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {}: {e}", config.bind_addr));
    tracing::info!(
        bind_addr = %config.bind_addr,
        discipline = ?config.discipline,
        "scheduler listening"
    );

    axum::serve(listener, app).await.expect("server error");
}
