//! Coverage tracker for the streaming session
//!
//! Keeps a sorted set of disjoint closed intervals as two parallel vectors of
//! start and end times. Inserting an interval merges it with every interval
//! it overlaps or touches.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of [`TimeSegments::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLookup {
    /// Whether the time lies inside the interval at `index`
    pub contained: bool,
    /// Last interval starting at or before the time
    pub index: Option<usize>,
}

/// Sorted, disjoint set of covered time intervals
///
/// # Example
///
/// ```rust
/// use ass_compiler::stream::TimeSegments;
///
/// let mut covered = TimeSegments::new();
/// covered.insert(1.0, 2.0);
/// covered.insert(3.0, 4.0);
/// covered.insert(1.5, 3.5);
/// assert_eq!(covered.starts(), &[1.0]);
/// assert_eq!(covered.ends(), &[4.0]);
/// assert!(covered.contains(2.5));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSegments {
    starts: Vec<f64>,
    ends: Vec<f64>,
}

impl TimeSegments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already disjoint, sorted intervals
    ///
    /// Intervals are inserted one by one, so unsorted or overlapping input
    /// is normalized as well.
    pub fn from_intervals(intervals: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut segments = Self::new();
        for (start, end) in intervals {
            segments.insert(start, end);
        }
        segments
    }

    #[must_use]
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    #[must_use]
    pub fn ends(&self) -> &[f64] {
        &self.ends
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Intervals in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.starts.iter().copied().zip(self.ends.iter().copied())
    }

    /// Locate `time` among the intervals
    #[must_use]
    pub fn check(&self, time: f64) -> SegmentLookup {
        let index = self
            .starts
            .partition_point(|&start| start <= time)
            .checked_sub(1);
        let contained = index.is_some_and(|i| time <= self.ends[i]);
        SegmentLookup { contained, index }
    }

    /// Whether `time` is covered
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.check(time).contained
    }

    /// Add `[start, end]`, merging with every interval it reaches
    ///
    /// Empty or inverted intervals and `NaN` bounds are ignored.
    pub fn insert(&mut self, start: f64, end: f64) {
        if start.is_nan() || end.is_nan() || end < start {
            tracing::trace!(start, end, "invalid interval ignored");
            return;
        }

        let from = self.check(start);
        let to = self.check(end);

        let (first, merged_start) = match from {
            SegmentLookup {
                contained: true,
                index: Some(i),
            } => (i, self.starts[i]),
            SegmentLookup { index, .. } => (index.map_or(0, |i| i + 1), start),
        };
        let merged_end = match to {
            SegmentLookup {
                contained: true,
                index: Some(i),
            } => self.ends[i],
            _ => end,
        };
        let last = to.index.map_or(0, |i| i + 1).max(first);

        self.starts.splice(first..last, [merged_start]);
        self.ends.splice(first..last, [merged_end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn seeded() -> TimeSegments {
        TimeSegments::from_intervals([(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)])
    }

    fn after(start: f64, end: f64) -> (Vec<f64>, Vec<f64>) {
        let mut segments = seeded();
        segments.insert(start, end);
        (segments.starts().to_vec(), segments.ends().to_vec())
    }

    #[test]
    fn check_reports_index_and_containment() {
        let segments = seeded();
        assert_eq!(segments.check(0.5), SegmentLookup { contained: false, index: None });
        assert_eq!(segments.check(1.5), SegmentLookup { contained: true, index: Some(0) });
        assert_eq!(segments.check(4.5), SegmentLookup { contained: false, index: Some(1) });
        assert_eq!(segments.check(6.0), SegmentLookup { contained: true, index: Some(2) });
    }

    #[test]
    fn inside_one_interval() {
        assert_eq!(after(1.25, 1.75), (vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn extends_one_interval() {
        assert_eq!(after(1.5, 2.5), (vec![1.0, 3.0, 5.0], vec![2.5, 4.0, 6.0]));
    }

    #[test]
    fn new_interval_in_gap() {
        assert_eq!(
            after(2.25, 2.75),
            (vec![1.0, 2.25, 3.0, 5.0], vec![2.0, 2.75, 4.0, 6.0])
        );
    }

    #[test]
    fn bridges_two_intervals() {
        assert_eq!(after(1.5, 3.5), (vec![1.0, 5.0], vec![4.0, 6.0]));
    }

    #[test]
    fn bridges_and_extends() {
        assert_eq!(after(1.5, 4.5), (vec![1.0, 5.0], vec![4.5, 6.0]));
    }

    #[test]
    fn gap_start_into_interval() {
        assert_eq!(after(2.5, 3.5), (vec![1.0, 2.5, 5.0], vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn gap_start_past_interval() {
        assert_eq!(after(2.5, 4.5), (vec![1.0, 2.5, 5.0], vec![2.0, 4.5, 6.0]));
    }

    #[test]
    fn before_everything_and_touching() {
        assert_eq!(after(0.0, 0.5), (vec![0.0, 1.0, 3.0, 5.0], vec![0.5, 2.0, 4.0, 6.0]));
        assert_eq!(after(2.0, 3.0), (vec![1.0, 5.0], vec![4.0, 6.0]));
        assert_eq!(after(0.0, 10.0), (vec![0.0], vec![10.0]));
    }

    #[test]
    fn invalid_intervals_are_ignored() {
        assert_eq!(after(3.0, 1.0), (vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]));
        assert_eq!(after(f64::NAN, 1.0), (vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]));
    }

    fn interval() -> impl Strategy<Value = (f64, f64)> {
        (0u32..200, 0u32..40).prop_map(|(start, len)| {
            let start = f64::from(start) / 4.0;
            (start, start + f64::from(len) / 4.0)
        })
    }

    proptest! {
        #[test]
        fn stays_sorted_disjoint_and_covers_union(inserts in prop::collection::vec(interval(), 0..20)) {
            let mut segments = seeded();
            let mut all = vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)];
            for &(start, end) in &inserts {
                segments.insert(start, end);
                all.push((start, end));
            }

            for pair in segments.starts().windows(2).zip(segments.ends().windows(2)) {
                let (starts, ends) = pair;
                prop_assert!(starts[0] <= ends[0]);
                prop_assert!(ends[0] < starts[1]);
                prop_assert!(starts[1] <= ends[1]);
            }

            // sample a grid finer than the generated endpoints
            for step in 0..=1000u32 {
                let time = f64::from(step) / 16.0;
                let expected = all.iter().any(|&(s, e)| s <= time && time <= e);
                prop_assert_eq!(segments.contains(time), expected, "time {}", time);
            }
        }
    }
}
