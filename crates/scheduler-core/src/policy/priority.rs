use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{Policy, ReadyKey};

/// Strict lexicographic order: priority ascending, arrival ascending,
/// admission-sequence ascending. `BinaryHeap` is a max-heap, so we wrap
/// `ReadyKey` and flip the comparison to get a min-heap on that tuple.
#[derive(Debug)]
struct Entry(ReadyKey);

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the greatest element, we want the least.
        (other.0.priority, other.0.arrival_ms, other.0.sequence).cmp(&(
            self.0.priority,
            self.0.arrival_ms,
            self.0.sequence,
        ))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct PriorityPolicy {
    heap: BinaryHeap<Entry>,
}

impl PriorityPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for PriorityPolicy {
    fn push(&mut self, key: ReadyKey) {
        self.heap.push(Entry(key));
    }

    fn pop_one(&mut self) -> Option<ReadyKey> {
        self.heap.pop().map(|e| e.0)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn quantum_ms(&self) -> Option<u64> {
        None
    }
}
