use std::collections::VecDeque;

use super::{Policy, ReadyKey};

/// First-in-first-out, non-preemptive. Ordering is pure admission order —
/// jobs arriving at the same simulated instant keep the dataset's row order
/// because admission promotes them in that order.
#[derive(Debug, Default)]
pub struct FifoPolicy {
    queue: VecDeque<ReadyKey>,
}

impl FifoPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for FifoPolicy {
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
        None
    }
}
