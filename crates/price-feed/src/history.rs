//! Bounded datapoint history
//!
//! Each source owns one history. The oldest datapoint is evicted once the
//! capacity is reached.

use parking_lot::Mutex;
use std::collections::VecDeque;

use oracle_core::DataPoint;

pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Ordered history of datapoints, oldest first
#[derive(Debug)]
pub struct History<T> {
    points: Mutex<VecDeque<DataPoint<T>>>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY))),
            capacity,
        }
    }

    /// Append a datapoint, evicting the oldest if full
    pub fn store(&self, point: DataPoint<T>) {
        let mut points = self.points.lock();
        if points.len() == self.capacity {
            points.pop_front();
        }
        points.push_back(point);
    }

    pub fn latest(&self) -> Option<DataPoint<T>> {
        self.points.lock().back().cloned()
    }

    /// Snapshot of all datapoints, oldest first
    pub fn all(&self) -> Vec<DataPoint<T>> {
        self.points.lock().iter().cloned().collect()
    }

    pub fn depth(&self) -> usize {
        self.points.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
