//! Error taxonomy for the scheduler engine.
//!
//! Mirrors the client/transient/fatal split in the spec: client mistakes
//! become a typed variant the HTTP layer maps to 4xx, transient states
//! (`no_run`/`wait`/`done`) are not errors at all and never appear here,
//! and anything unexpected collapses into `Internal`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("insufficient slots: need {needed}, have {available}")]
    InsufficientSlots { needed: u32, available: u32 },

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("dataset invalid: {0}")]
    DatasetInvalid(String),

    #[error("unknown worker: {0}")]
    UnknownWorker(String),

    #[error("invalid core {core_id} for worker {worker_id}")]
    InvalidCore { worker_id: String, core_id: u32 },

    #[error("unknown job: {0}")]
    UnknownJob(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ScheduleError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InsufficientSlots { .. } => 400,
            Self::DatasetNotFound(_) => 400,
            Self::DatasetInvalid(_) => 400,
            Self::UnknownWorker(_) => 400,
            Self::InvalidCore { .. } => 400,
            Self::UnknownJob(_) => 400,
            Self::Internal(_) => 500,
        }
    }
}
