use std::collections::VecDeque;
use std::collections::vec_deque::Drain;

use super::keys::InputSnapshot;

pub const DEFAULT_INPUT_QUEUE_CAPACITY: usize = 64;

/// FIFO of peer input snapshots, drained whole once per host tick.
///
/// Bounded: when full, the oldest snapshot is discarded to make room.
#[derive(Debug)]
pub struct InputQueue {
    snapshots: VecDeque<InputSnapshot>,
    capacity: usize,
    dropped: u64,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_QUEUE_CAPACITY)
    }
}

impl InputQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Returns the snapshot evicted to make room, if any.
    pub fn push(&mut self, snapshot: InputSnapshot) -> Option<InputSnapshot> {
        let evicted = if self.snapshots.len() >= self.capacity {
            self.dropped += 1;
            self.snapshots.pop_front()
        } else {
            None
        };
        self.snapshots.push_back(snapshot);
        evicted
    }

    pub fn drain(&mut self) -> Drain<'_, InputSnapshot> {
        self.snapshots.drain(..)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
