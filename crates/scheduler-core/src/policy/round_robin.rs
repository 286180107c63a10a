use std::collections::VecDeque;

use super::{Policy, ReadyKey};

/// Quantum-preemptive round robin. Head of a FIFO queue; a job that didn't
/// finish its slice re-enters at the tail (the engine re-pushes it via
/// `push` after a non-final `/done`).
#[derive(Debug)]
pub struct RoundRobinPolicy {
    queue: VecDeque<ReadyKey>,
    quantum_ms: u64,
}

impl RoundRobinPolicy {
    pub fn new(quantum_ms: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            quantum_ms,
        }
    }
}

impl Policy for RoundRobinPolicy {
    fn push(&mut self, key: ReadyKey) {
        self.queue.push_back(key);
    }

    fn pop_one(&mut self) -> Option<ReadyKey> {
        self.queue.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn quantum_ms(&self) -> Option<u64> {
        Some(self.quantum_ms)
    }
}
