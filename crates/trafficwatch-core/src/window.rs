use std::collections::VecDeque;

/// Bounded FIFO of hits-per-period samples covering the alerting window.
/// Capacity is `alert_period / stats_period`; the oldest sample is evicted
/// when a new one lands at capacity.
#[derive(Debug)]
pub struct TrafficHistory {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl TrafficHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a period sample. With capacity 0 (alert period shorter than
    /// the stats period) samples are dropped and the rate stays 0.
    pub fn push(&mut self, hits: u64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(hits);
    }

    pub fn sum(&self) -> u64 {
        self.samples.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
