//! Merge-on-insert set of closed value intervals.

use crate::view::Range;

/// Union of the value ranges swept inside one bucket.
///
/// Most buckets only ever hold one merged range; a second representation is
/// used once inserted ranges stop overlapping, which only happens when gaps
/// (missing values) separate runs of samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IntervalSet {
    /// No value seen yet.
    #[default]
    Empty,
    /// One merged (possibly degenerate) interval.
    Single(Range),
    /// Two or more intervals sorted ascending by `min`. No two overlap or touch.
    Disjoint(Vec<Range>),
}

impl IntervalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::Empty
    }

    /// Insert the closed interval `[lo, hi]`, merging every overlapping or
    /// touching interval into it.
    ///
    /// Callers must never pass NaN and must keep `lo <= hi`.
    pub fn add(&mut self, lo: f64, hi: f64) {
        debug_assert!(lo <= hi, "interval bounds out of order: [{lo}, {hi}]");
        let incoming = Range { min: lo, max: hi };
        match self {
            Self::Empty => *self = Self::Single(incoming),
            Self::Single(current) => {
                let current = *current;
                *self = if current.touches(&incoming) {
                    Self::Single(Range::union(current, incoming))
                } else if incoming.min < current.min {
                    Self::Disjoint(vec![incoming, current])
                } else {
                    Self::Disjoint(vec![current, incoming])
                };
            }
            Self::Disjoint(intervals) => {
                insert_merged(intervals, incoming);
                if intervals.len() == 1 {
                    let only = intervals[0];
                    *self = Self::Single(only);
                }
            }
        }
    }

    /// Lowest value covered, or `+inf` when empty.
    pub fn min(&self) -> f64 {
        match self {
            Self::Empty => f64::INFINITY,
            Self::Single(range) => range.min,
            Self::Disjoint(intervals) => intervals.first().map_or(f64::INFINITY, |r| r.min),
        }
    }

    /// Highest value covered, or `-inf` when empty.
    pub fn max(&self) -> f64 {
        match self {
            Self::Empty => f64::NEG_INFINITY,
            Self::Single(range) => range.max,
            Self::Disjoint(intervals) => intervals.last().map_or(f64::NEG_INFINITY, |r| r.max),
        }
    }

    /// The disjoint intervals in ascending order.
    ///
    /// Returns `None` while zero or one interval is held; use [`Self::min`]
    /// and [`Self::max`] then.
    pub fn as_disjoint_intervals(&self) -> Option<&[Range]> {
        match self {
            Self::Disjoint(intervals) => Some(intervals),
            Self::Empty | Self::Single(_) => None,
        }
    }

    /// Number of disjoint intervals held.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Disjoint(intervals) => intervals.len(),
        }
    }

    /// Check whether no value has been added.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        *self = Self::Empty;
    }
}

fn insert_merged(intervals: &mut Vec<Range>, incoming: Range) {
    // Sorted and disjoint, so both bounds are ascending.
    let start = intervals.partition_point(|r| r.max < incoming.min);
    let end = intervals.partition_point(|r| r.min <= incoming.max);
    if start == end {
        intervals.insert(start, incoming);
        return;
    }
    let merged = Range {
        min: incoming.min.min(intervals[start].min),
        max: incoming.max.max(intervals[end - 1].max),
    };
    intervals.splice(start..end, [merged]);
}
