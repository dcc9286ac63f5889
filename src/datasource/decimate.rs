//! Pixel-bucket decimation.
//!
//! Samples are grouped into fixed-width buckets along the independent axis.
//! Each bucket keeps its first and last value plus the union of every value
//! range its line segments swept through, and is replaced in the output by a
//! handful of points sharing the bucket coordinate. Drawn as a polyline at
//! one bucket per pixel, the result covers exactly the pixels the full data
//! would.

use crate::datasource::DataError;
use crate::datasource::interval::IntervalSet;
use crate::geom::{MISSING, Point, is_missing, same_value};
use crate::sink::LineBuffer;
use crate::transform::BucketGrid;
use crate::view::Range;

/// Per-bucket accumulator shared by both decimator modes.
#[derive(Debug, Clone)]
struct BucketState {
    grid: BucketGrid,
    bucket: Option<f64>,
    first_value: f64,
    last_value: f64,
    sample_count: usize,
    intervals: IntervalSet,
}

impl BucketState {
    fn new(grid: BucketGrid) -> Self {
        Self {
            grid,
            bucket: None,
            first_value: MISSING,
            last_value: MISSING,
            sample_count: 0,
            intervals: IntervalSet::new(),
        }
    }

    /// Feed one sample, flushing the previous bucket into `sink` if the sample
    /// opens a new one. Returns the number of points flushed.
    fn push<B: LineBuffer + ?Sized>(&mut self, sink: &mut B, point: Point) -> usize {
        let index = self.grid.bucket_index(point.x);
        match self.bucket {
            Some(current) if index <= current => {
                self.absorb(point.y);
                0
            }
            Some(_) => {
                let flushed = self.flush(sink);
                self.start(index, point.y);
                flushed
            }
            None => {
                self.start(index, point.y);
                0
            }
        }
    }

    fn start(&mut self, index: f64, value: f64) {
        self.bucket = Some(index);
        self.sample_count = 0;
        self.intervals.clear();
        self.first_value = value;
        if !is_missing(value) {
            self.intervals.add(value, value);
        }
        self.last_value = value;
        self.sample_count += 1;
    }

    fn absorb(&mut self, value: f64) {
        if !is_missing(value) {
            let previous = self.last_value;
            if is_missing(previous) {
                self.intervals.add(value, value);
            } else {
                self.intervals.add(previous.min(value), previous.max(value));
            }
        }
        self.last_value = value;
        self.sample_count += 1;
    }

    /// Emit the current bucket as if it were complete.
    fn flush<B: LineBuffer + ?Sized>(&self, sink: &mut B) -> usize {
        match self.bucket {
            None => 0,
            Some(index) => flush_bucket(
                sink,
                self.grid.bucket_start(index),
                self.first_value,
                &self.intervals,
                self.last_value,
                self.sample_count,
            ),
        }
    }
}

/// Writes flush output at a fixed coordinate and remembers the last value.
struct Emitter<'a, B: LineBuffer + ?Sized> {
    sink: &'a mut B,
    x: f64,
    last: Option<f64>,
    count: usize,
}

impl<'a, B: LineBuffer + ?Sized> Emitter<'a, B> {
    fn new(sink: &'a mut B, x: f64) -> Self {
        Self {
            sink,
            x,
            last: None,
            count: 0,
        }
    }

    fn emit(&mut self, value: f64) {
        self.sink.push_point(Point::new(self.x, value));
        self.last = Some(value);
        self.count += 1;
    }

    /// Break the line, unless it is already broken.
    fn gap(&mut self) {
        if !self.last.is_some_and(is_missing) {
            self.emit(MISSING);
        }
    }

    fn last_is(&self, value: f64) -> bool {
        self.last.is_some_and(|last| same_value(last, value))
    }
}

/// Emit the representative points of one bucket at `bucket_x`.
///
/// Output always starts with `first` and ends with `last`; in between it
/// visits the swept intervals, skipping extremes already implied by the
/// endpoints. Returns the number of points emitted.
pub(crate) fn flush_bucket<B: LineBuffer + ?Sized>(
    sink: &mut B,
    bucket_x: f64,
    first: f64,
    intervals: &IntervalSet,
    last: f64,
    sample_count: usize,
) -> usize {
    let mut out = Emitter::new(sink, bucket_x);
    out.emit(first);
    match intervals {
        IntervalSet::Empty => {
            if sample_count > 1 && !is_missing(first) && !is_missing(last) && first != last {
                out.gap();
            }
        }
        IntervalSet::Single(range) => {
            let (lo, hi) = (range.min, range.max);
            if lo != first && lo != last {
                out.emit(lo);
            }
            if hi != first && hi != last && hi != lo {
                out.emit(hi);
            }
        }
        IntervalSet::Disjoint(ranges) => emit_disjoint(&mut out, ranges, first, last),
    }
    if !out.last_is(last) {
        out.emit(last);
    }
    out.count
}

fn emit_disjoint<B: LineBuffer + ?Sized>(
    out: &mut Emitter<'_, B>,
    ranges: &[Range],
    first: f64,
    last: f64,
) {
    // Walk towards `last` so the outer extremes can coincide with the endpoints.
    let ascending = first <= last;
    let n = ranges.len();
    for step in 0..n {
        let range = if ascending {
            ranges[step]
        } else {
            ranges[n - 1 - step]
        };
        let (near, far) = if ascending {
            (range.min, range.max)
        } else {
            (range.max, range.min)
        };
        if step > 0 {
            out.gap();
        }
        if step == 0 {
            if !range.contains(first) {
                out.gap();
            }
            if near != first {
                out.emit(near);
            }
            if far != first && far != near {
                out.emit(far);
            }
        } else if step == n - 1 {
            if near != last {
                out.emit(near);
            }
            if far != last && far != near {
                out.emit(far);
            }
            if !range.contains(last) {
                out.gap();
            }
        } else if near == far {
            if near != first && near != last {
                out.emit(near);
            }
        } else {
            out.emit(near);
            out.emit(far);
        }
    }
}

/// One-shot decimation of a whole run of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchDecimator {
    grid: BucketGrid,
}

impl BatchDecimator {
    /// Create a batch decimator over the given grid.
    pub fn new(grid: BucketGrid) -> Self {
        Self { grid }
    }

    /// Access the bucket grid.
    pub fn grid(&self) -> BucketGrid {
        self.grid
    }

    /// Decimate `points` (independent coordinate in `x`) into `sink`.
    ///
    /// Returns the number of points appended.
    pub fn decimate<B, I>(&self, points: I, sink: &mut B) -> usize
    where
        B: LineBuffer + ?Sized,
        I: IntoIterator<Item = Point>,
    {
        let mut state = BucketState::new(self.grid);
        let mut emitted = 0;
        for point in points {
            emitted += state.push(sink, point);
        }
        emitted + state.flush(sink)
    }

    /// Decimate paired coordinate slices into `sink`.
    ///
    /// Mismatched lengths are rejected before anything is written.
    pub fn decimate_slices<B: LineBuffer + ?Sized>(
        &self,
        xs: &[f64],
        ys: &[f64],
        sink: &mut B,
    ) -> Result<usize, DataError> {
        if xs.len() != ys.len() {
            return Err(DataError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let points = xs.iter().zip(ys).map(|(&x, &y)| Point::new(x, y));
        Ok(self.decimate(points, sink))
    }
}

/// Decimate a slice of points into a new vector.
pub fn decimate(points: &[Point], grid: BucketGrid) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len().min(1024));
    BatchDecimator::new(grid).decimate(points.iter().copied(), &mut out);
    out
}

/// Incremental decimation where samples arrive one at a time.
///
/// The decimator owns a short work-in-progress suffix of its sink: the
/// provisional rendering of the still-open bucket. Every call erases and
/// rewrites that suffix, so everything before it is stable.
#[derive(Debug, Clone)]
pub struct StreamingDecimator {
    state: BucketState,
    work_in_progress: usize,
}

impl StreamingDecimator {
    /// Create a streaming decimator over the given grid.
    pub fn new(grid: BucketGrid) -> Self {
        Self {
            state: BucketState::new(grid),
            work_in_progress: 0,
        }
    }

    /// Access the bucket grid.
    pub fn grid(&self) -> BucketGrid {
        self.state.grid
    }

    /// Number of trailing sink points owned by this decimator.
    pub fn work_in_progress(&self) -> usize {
        self.work_in_progress
    }

    /// Feed one sample.
    ///
    /// Returns how many trailing points of `sink` were added or rewritten,
    /// counted from the end of the stable prefix.
    pub fn add<B: LineBuffer + ?Sized>(&mut self, sink: &mut B, point: Point) -> usize {
        sink.remove_last(self.work_in_progress);
        let before = sink.len();
        self.state.push(sink, point);
        self.work_in_progress = self.state.flush(sink);
        tracing::trace!(
            work_in_progress = self.work_in_progress,
            "streamed sample into bucket"
        );
        sink.len().saturating_sub(before)
    }

    /// Make the work-in-progress suffix permanent.
    ///
    /// The open bucket is closed as it stands; the next sample starts a fresh
    /// bucket even if it falls in the same one.
    pub fn commit(&mut self) {
        self.work_in_progress = 0;
        self.state = BucketState::new(self.state.grid);
    }

    /// Forget ownership of suffix points that no longer exist in a sink of `len` points.
    pub(crate) fn clamp_work_in_progress(&mut self, len: usize) {
        self.work_in_progress = self.work_in_progress.min(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit() -> BucketGrid {
        BucketGrid::unit()
    }

    fn pts(values: &[(f64, f64)]) -> Vec<Point> {
        values.iter().copied().map(Point::from).collect()
    }

    fn ys(points: &[Point]) -> Vec<f64> {
        points.iter().map(|p| p.y).collect()
    }

    fn assert_same(actual: &[Point], expected: &[Point]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.same_as(e), "{actual:?} vs {expected:?}");
        }
    }

    fn stream(points: &[Point], grid: BucketGrid) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        let mut decimator = StreamingDecimator::new(grid);
        for point in points {
            decimator.add(&mut out, *point);
        }
        out
    }

    #[test]
    fn single_sample_emits_one_point() {
        assert_eq!(decimate(&pts(&[(0.5, 1.0)]), unit()), pts(&[(0.0, 1.0)]));
    }

    #[test]
    fn two_samples_in_bucket_emit_both_values() {
        let out = decimate(&pts(&[(0.5, 1.0), (0.6, 2.0)]), unit());
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0)]));
    }

    #[test]
    fn monotonic_sweep_collapses_to_endpoints() {
        let out = decimate(&pts(&[(0.5, 3.0), (0.6, 2.0), (0.7, 1.0)]), unit());
        assert_eq!(out, pts(&[(0.0, 3.0), (0.0, 1.0)]));
    }

    #[test]
    fn separate_buckets_emit_one_point_each() {
        let out = decimate(&pts(&[(0.5, 1.0), (2.5, 2.0), (4.5, 3.0)]), unit());
        assert_eq!(out, pts(&[(0.0, 1.0), (2.0, 2.0), (4.0, 3.0)]));
    }

    #[test]
    fn zigzag_keeps_both_extremes() {
        let out = decimate(
            &pts(&[(0.1, 0.0), (0.2, 5.0), (0.3, -5.0), (0.4, 1.0)]),
            unit(),
        );
        assert_eq!(ys(&out), vec![0.0, -5.0, 5.0, 1.0]);
    }

    #[test]
    fn empty_input_emits_nothing() {
        let mut out: Vec<Point> = Vec::new();
        assert_eq!(BatchDecimator::new(unit()).decimate([], &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn mismatched_slices_are_rejected() {
        let mut out: Vec<Point> = Vec::new();
        let result = BatchDecimator::new(unit()).decimate_slices(&[0.0, 1.0], &[1.0], &mut out);
        assert_eq!(result, Err(DataError::LengthMismatch { xs: 2, ys: 1 }));
        assert!(out.is_empty());
    }

    #[test]
    fn all_missing_bucket_emits_single_gap() {
        let out = decimate(&pts(&[(0.1, MISSING), (0.2, MISSING), (0.3, MISSING)]), unit());
        assert_same(&out, &[Point::gap(0.0)]);
    }

    #[test]
    fn interior_missing_run_inside_bucket_is_absorbed() {
        let out = decimate(
            &pts(&[(0.1, 1.0), (0.2, MISSING), (0.3, MISSING), (0.4, 1.0)]),
            unit(),
        );
        assert_eq!(out, pts(&[(0.0, 1.0)]));
    }

    #[test]
    fn trailing_missing_value_breaks_line() {
        let out = decimate(
            &pts(&[(0.1, 0.0), (0.2, 1.0), (0.3, MISSING), (1.5, 3.0)]),
            unit(),
        );
        assert_same(
            &out,
            &pts(&[(0.0, 0.0), (0.0, 1.0), (0.0, MISSING), (1.0, 3.0)]),
        );
    }

    #[test]
    fn missing_bucket_between_present_buckets_is_preserved() {
        let out = decimate(&pts(&[(0.5, 1.0), (1.5, MISSING), (2.5, 2.0)]), unit());
        assert_same(&out, &pts(&[(0.0, 1.0), (1.0, MISSING), (2.0, 2.0)]));
    }

    #[test]
    fn disjoint_runs_ascending_are_separated_by_gaps() {
        let out = decimate(
            &pts(&[(0.1, 0.0), (0.2, 1.0), (0.3, MISSING), (0.4, 5.0), (0.5, 6.0)]),
            unit(),
        );
        assert_same(
            &out,
            &pts(&[(0.0, 0.0), (0.0, 1.0), (0.0, MISSING), (0.0, 5.0), (0.0, 6.0)]),
        );
    }

    #[test]
    fn disjoint_runs_descending_walk_from_the_top() {
        let out = decimate(
            &pts(&[(0.1, 6.0), (0.2, 5.0), (0.3, MISSING), (0.4, 1.0), (0.5, 0.0)]),
            unit(),
        );
        assert_same(
            &out,
            &pts(&[(0.0, 6.0), (0.0, 5.0), (0.0, MISSING), (0.0, 1.0), (0.0, 0.0)]),
        );
    }

    #[test]
    fn interior_degenerate_interval_is_emitted_between_gaps() {
        let out = decimate(
            &pts(&[(0.1, 0.0), (0.2, MISSING), (0.3, 3.0), (0.4, MISSING), (0.5, 6.0)]),
            unit(),
        );
        assert_same(
            &out,
            &pts(&[(0.0, 0.0), (0.0, MISSING), (0.0, 3.0), (0.0, MISSING), (0.0, 6.0)]),
        );
    }

    #[test]
    fn first_value_outside_leading_interval_breaks_line() {
        let mut intervals = IntervalSet::new();
        intervals.add(0.0, 1.0);
        intervals.add(5.0, 6.0);
        let mut out: Vec<Point> = Vec::new();
        let emitted = flush_bucket(&mut out, 0.0, 5.0, &intervals, 6.0, 4);
        assert_eq!(emitted, out.len());
        assert_same(
            &out,
            &pts(&[
                (0.0, 5.0),
                (0.0, MISSING),
                (0.0, 0.0),
                (0.0, 1.0),
                (0.0, MISSING),
                (0.0, 5.0),
                (0.0, 6.0),
            ]),
        );
    }

    #[test]
    fn empty_set_with_changed_endpoints_forces_break() {
        let mut out: Vec<Point> = Vec::new();
        let emitted = flush_bucket(&mut out, 3.0, 1.0, &IntervalSet::Empty, 2.0, 3);
        assert_eq!(emitted, 3);
        assert_same(&out, &pts(&[(3.0, 1.0), (3.0, MISSING), (3.0, 2.0)]));
    }

    #[test]
    fn empty_set_without_break_conditions_connects_endpoints() {
        let mut out: Vec<Point> = Vec::new();
        flush_bucket(&mut out, 0.0, 1.0, &IntervalSet::Empty, 2.0, 1);
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0)]));

        let mut out: Vec<Point> = Vec::new();
        flush_bucket(&mut out, 0.0, 1.0, &IntervalSet::Empty, 1.0, 5);
        assert_eq!(out, pts(&[(0.0, 1.0)]));

        let mut out: Vec<Point> = Vec::new();
        flush_bucket(&mut out, 0.0, 1.0, &IntervalSet::Empty, MISSING, 5);
        assert_same(&out, &pts(&[(0.0, 1.0), (0.0, MISSING)]));
    }

    #[test]
    fn single_interval_skips_endpoint_duplicates() {
        let mut out: Vec<Point> = Vec::new();
        let intervals = IntervalSet::Single(Range::new(-1.0, 4.0));
        flush_bucket(&mut out, 0.0, 4.0, &intervals, 2.0, 10);
        assert_eq!(ys(&out), vec![4.0, -1.0, 2.0]);
    }

    #[test]
    fn negative_scale_decimates_descending_data() {
        let grid = BucketGrid::new(0.0, -1.0).unwrap();
        let out = decimate(&pts(&[(-0.2, 1.0), (-0.6, 2.0), (-1.5, 3.0)]), grid);
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0), (-1.0, 3.0)]));
    }

    #[test]
    fn streaming_reports_rewritten_suffix() {
        let mut out: Vec<Point> = Vec::new();
        let mut decimator = StreamingDecimator::new(unit());

        assert_eq!(decimator.add(&mut out, Point::new(0.5, 1.0)), 1);
        assert_eq!(decimator.work_in_progress(), 1);

        assert_eq!(decimator.add(&mut out, Point::new(0.6, 2.0)), 2);
        assert_eq!(decimator.work_in_progress(), 2);
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0)]));

        // Closing bucket 0 persists its two points and opens bucket 1.
        assert_eq!(decimator.add(&mut out, Point::new(1.5, 3.0)), 3);
        assert_eq!(decimator.work_in_progress(), 1);
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0), (1.0, 3.0)]));

        // A flat continuation rewrites only the open bucket.
        assert_eq!(decimator.add(&mut out, Point::new(1.7, 3.0)), 1);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn streaming_leaves_stable_prefix_untouched() {
        let mut out = pts(&[(-10.0, 42.0)]);
        let mut decimator = StreamingDecimator::new(unit());
        for i in 0..20 {
            decimator.add(&mut out, Point::new(i as f64 * 0.25, (i % 3) as f64));
        }
        assert_eq!(out[0], Point::new(-10.0, 42.0));
    }

    #[test]
    fn commit_persists_open_bucket() {
        let mut out: Vec<Point> = Vec::new();
        let mut decimator = StreamingDecimator::new(unit());
        decimator.add(&mut out, Point::new(0.1, 1.0));
        decimator.add(&mut out, Point::new(0.2, 2.0));
        decimator.commit();
        assert_eq!(decimator.work_in_progress(), 0);
        decimator.add(&mut out, Point::new(0.3, 2.0));
        assert_eq!(out, pts(&[(0.0, 1.0), (0.0, 2.0), (0.0, 2.0)]));
    }

    #[test]
    fn clamp_forgets_removed_suffix() {
        let mut out: Vec<Point> = Vec::new();
        let mut decimator = StreamingDecimator::new(unit());
        decimator.add(&mut out, Point::new(0.1, 1.0));
        decimator.add(&mut out, Point::new(0.2, 2.0));
        out.clear();
        decimator.clamp_work_in_progress(out.len());
        assert_eq!(decimator.work_in_progress(), 0);
    }

    fn series() -> impl Strategy<Value = Vec<Point>> {
        let value = prop_oneof![9 => -50.0f64..50.0, 1 => Just(MISSING)];
        prop::collection::vec((0.0f64..0.7, value), 0..200).prop_map(|steps| {
            let mut x = 0.0;
            steps
                .into_iter()
                .map(|(dx, y)| {
                    x += dx;
                    Point::new(x, y)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn streaming_matches_batch(points in series(), scale in 0.1f64..3.0) {
            let grid = BucketGrid::new(0.0, scale).unwrap();
            let batch = decimate(&points, grid);
            let streamed = stream(&points, grid);
            prop_assert_eq!(batch.len(), streamed.len());
            for (b, s) in batch.iter().zip(&streamed) {
                prop_assert!(b.same_as(s), "{:?} vs {:?}", b, s);
            }
        }

        #[test]
        fn sparse_data_is_reproduced_exactly(
            steps in prop::collection::vec((1i32..5, -1000.0f64..1000.0), 1..100)
        ) {
            let mut x = 0;
            let points: Vec<Point> = steps
                .into_iter()
                .map(|(dx, y)| {
                    x += dx;
                    Point::new(x as f64, y)
                })
                .collect();
            prop_assert_eq!(decimate(&points, unit()), points);
        }

        #[test]
        fn flat_line_collapses_to_one_point(count in 1usize..500, y in -10.0f64..10.0) {
            let points: Vec<Point> = (0..count)
                .map(|i| Point::new(i as f64 / count as f64, y))
                .collect();
            prop_assert_eq!(decimate(&points, unit()), vec![Point::new(0.0, y)]);
        }

        #[test]
        fn gap_free_bucket_flush_is_bounded(
            values in prop::collection::vec(-100.0f64..100.0, 1..500)
        ) {
            let n = values.len() as f64;
            let points: Vec<Point> = values
                .iter()
                .enumerate()
                .map(|(i, &y)| Point::new(i as f64 / n, y))
                .collect();
            let out = decimate(&points, unit());
            prop_assert!(out.len() <= 4, "{:?}", out);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(out.iter().any(|p| p.y == min));
            prop_assert!(out.iter().any(|p| p.y == max));
        }
    }
}
