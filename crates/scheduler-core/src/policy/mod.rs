//! Scheduling disciplines as interchangeable policies over a common ready
//! set. The run engine is policy-agnostic; only this module differs per
//! discipline (`spec.md` §9, "Policy as strategy").
//!
//! The canonical `Job` state lives in the run engine's job map; a policy's
//! ready structure only ever holds the ordering fields it needs
//! (`ReadyKey`), looked back up against the job map on pop. This avoids two
//! copies of mutable job state disagreeing with each other.

mod fifo;
mod priority;
mod round_robin;

pub use fifo::FifoPolicy;
pub use priority::PriorityPolicy;
pub use round_robin::RoundRobinPolicy;

use crate::job::{Job, Sequence};

/// The ordering-relevant projection of a `Job` used by a policy's ready
/// structure.
#[derive(Debug, Clone)]
pub struct ReadyKey {
    pub job_id: String,
    pub priority: i64,
    pub arrival_ms: u64,
    pub sequence: Sequence,
}

impl From<&Job> for ReadyKey {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            priority: job.priority,
            arrival_ms: job.arrival_ms,
            sequence: job.sequence,
        }
    }
}

/// A scheduling discipline's view of the ready set. Implementations own no
/// lock themselves — the run engine holds `run_lock` across every call.
pub trait Policy: Send {
    /// Admit a job into the ready set (initial admission, or promotion of a
    /// pending arrival, or an RR re-queue after a non-final slice).
    fn push(&mut self, key: ReadyKey);

    /// Pop exactly one key to dispatch, per the policy's ordering. Must not
    /// be called speculatively — callers only invoke this once committed to
    /// returning `ok` to the waiting core.
    fn pop_one(&mut self) -> Option<ReadyKey>;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// `Some(quantum)` for round-robin, `None` for non-preemptive policies.
    /// The engine uses this to decide between `execution_ms` (whole
    /// service time) and `slice_ms = min(quantum, remaining)`.
    fn quantum_ms(&self) -> Option<u64>;
}
