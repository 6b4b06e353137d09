//! Bounded, time-ordered sample window

use super::{Granularity, Sample};

/// Samples ascending by timestamp, bounded to the granularity's record limit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    granularity: Granularity,
    samples: Vec<Sample>,
}

impl Window {
    /// Build a window from records in arbitrary order
    ///
    /// Records are sorted ascending by timestamp. When more records than the
    /// granularity allows are supplied, only the most recent are kept.
    pub fn from_records(granularity: Granularity, mut records: Vec<Sample>) -> Self {
        records.sort_by_key(|s| s.timestamp);
        let limit = granularity.record_limit();
        if records.len() > limit {
            records.drain(..records.len() - limit);
        }
        Self {
            granularity,
            samples: records,
        }
    }

    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            samples: Vec::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_sorted_ascending() {
        let records = vec![
            Sample::new(3000, 1.3, 0.0),
            Sample::new(1000, 1.1, 0.0),
            Sample::new(2000, 1.2, 0.0),
        ];
        let window = Window::from_records(Granularity::Daily, records);
        let ts: Vec<i64> = window.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![1000, 2000, 3000]);
        assert_eq!(window.last().unwrap().height, 1.3);
    }

    #[test]
    fn test_window_keeps_most_recent_records() {
        let records: Vec<Sample> = (0..30).rev().map(|i| Sample::new(i, 1.0, 0.0)).collect();
        let window = Window::from_records(Granularity::Daily, records);
        assert_eq!(window.len(), 24);
        assert_eq!(window.samples()[0].timestamp, 6);
        assert_eq!(window.last().unwrap().timestamp, 29);
    }

    #[test]
    fn test_empty_window() {
        let window = Window::empty(Granularity::Weekly);
        assert!(window.is_empty());
        assert_eq!(window.granularity(), Granularity::Weekly);
        assert!(window.last().is_none());
    }
}
