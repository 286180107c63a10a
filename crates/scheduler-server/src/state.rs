//! Shared state handed to every handler via an axum `Extension`: a small
//! `Clone` struct of `Arc`s.

use std::sync::Arc;

use scheduler_core::Discipline;

use crate::registry::WorkerRegistry;
use crate::run::RunEngine;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WorkerRegistry>,
    pub engine: Arc<RunEngine>,
    /// The discipline this scheduler instance was started with — each
    /// deployment runs one binary per discipline, so `/start` doesn't take
    /// it as a request field.
    pub discipline: Discipline,
}
