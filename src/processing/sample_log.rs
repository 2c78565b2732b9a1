//! Append-only sample log
//!
//! Samples are never mutated once logged. With a capacity set, the oldest
//! samples are evicted first; the latest known location survives eviction.

use std::collections::VecDeque;

use crate::core::types::{Coordinate, SampleRecord, SensorSample};

#[derive(Debug, Clone, Default)]
pub struct SampleLog {
    samples: VecDeque<SensorSample>,
    capacity: Option<usize>,
    latest_location: Option<Coordinate>,
    total_appended: u64,
    evicted: u64,
}

impl SampleLog {
    /// Unbounded log
    pub fn new() -> Self {
        Self::default()
    }

    /// Log retaining at most `capacity` samples (`None` for unbounded)
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.map(|c| c.max(1)),
            ..Self::default()
        }
    }

    pub fn push(&mut self, sample: SensorSample) {
        if let Some(coordinate) = sample.coordinate() {
            self.latest_location = Some(*coordinate);
        }
        if let Some(capacity) = self.capacity {
            while self.samples.len() >= capacity {
                self.samples.pop_front();
                self.evicted += 1;
            }
        }
        self.samples.push_back(sample);
        self.total_appended += 1;
    }

    /// Location of the most recent sample that carried one
    pub fn latest_location(&self) -> Option<&Coordinate> {
        self.latest_location.as_ref()
    }

    pub fn last(&self) -> Option<&SensorSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorSample> {
        self.samples.iter()
    }

    /// Retained samples in their sparse export form
    pub fn records(&self) -> Vec<SampleRecord> {
        self.samples.iter().map(|s| SampleRecord::from(*s)).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
