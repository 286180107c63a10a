//! scheduler-server — the Scheduler process.
//!
//! Fronts the Worker Registry and Run Engine with the long-poll dispatch
//! protocol (`spec.md` §4.3):
//!   POST /register   — upsert a worker's core count
//!   POST /heartbeat  — refresh a worker's liveness
//!   GET  /workers    — list alive workers + total slots
//!   POST /start      — admit a new run (replaces any active one)
//!   GET  /status     — no_run | running | done
//!   POST /next       — long-poll dispatch, one call per idle core
//!   POST /done       — report a completed job or RR slice
//!   GET  /health     — basic liveness

pub mod background;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod run;
pub mod state;
