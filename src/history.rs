//! Bounded history of the most recent values for one sensor

use std::collections::VecDeque;
use time::OffsetDateTime;

use crate::models::DataPoint;

#[derive(Debug, Clone)]
pub struct DataHistory {
    max_count: usize,
    points: VecDeque<DataPoint>,
}

impl DataHistory {
    pub fn new(max_count: usize) -> Self {
        DataHistory {
            max_count,
            points: VecDeque::new(),
        }
    }

    /// Append a value stamped with the current time
    ///
    /// The oldest point is evicted once `max_count` points are stored.
    pub fn append(&mut self, value: f64) {
        self.append_at(value, OffsetDateTime::now_utc());
    }

    pub fn append_at(&mut self, value: f64, timestamp: OffsetDateTime) {
        if self.max_count == 0 {
            return;
        }
        while self.points.len() >= self.max_count {
            self.points.pop_front();
        }
        self.points.push_back(DataPoint { value, timestamp });
    }

    /// Remove all points and change the capacity
    pub fn reset(&mut self, max_count: usize) {
        self.max_count = max_count;
        self.points.clear();
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn points(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    /// Values from oldest to newest
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = DataHistory::new(3);
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.append(value);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.values(), vec![3.0, 4.0, 5.0]);
        assert_eq!(history.latest().map(|p| p.value), Some(5.0));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = DataHistory::new(0);
        history.append(1.0);
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn large_capacity_is_not_allocated_up_front() {
        let mut history = DataHistory::new(usize::MAX);
        history.append(1.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.max_count(), usize::MAX);
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut history = DataHistory::new(2);
        history.append(1.0);
        history.append(2.0);
        history.reset(4);
        assert!(history.is_empty());
        assert_eq!(history.max_count(), 4);

        for value in [1.0, 2.0, 3.0, 4.0] {
            history.append(value);
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn keeps_given_timestamps_in_order() {
        let mut history = DataHistory::new(2);
        let start = OffsetDateTime::UNIX_EPOCH;
        history.append_at(1.0, start);
        history.append_at(2.0, start + time::Duration::seconds(2));
        let stamps: Vec<_> = history.points().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![start, start + time::Duration::seconds(2)]);
    }
}
