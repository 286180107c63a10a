use serde::{Deserialize, Serialize};

use crate::policy::{FifoPolicy, Policy, PriorityPolicy, RoundRobinPolicy};

/// Which scheduling discipline a run was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Fifo,
    Priority,
    RoundRobin,
}

impl Discipline {
    /// Builds the policy instance for this discipline. `quantum_ms` is
    /// required (and only meaningful) for round robin.
    pub fn build_policy(self, quantum_ms: Option<u64>) -> Box<dyn Policy> {
        match self {
            Discipline::Fifo => Box::new(FifoPolicy::new()),
            Discipline::Priority => Box::new(PriorityPolicy::new()),
            Discipline::RoundRobin => {
                Box::new(RoundRobinPolicy::new(quantum_ms.unwrap_or(100)))
            }
        }
    }

    pub fn is_round_robin(self) -> bool {
        matches!(self, Discipline::RoundRobin)
    }
}
