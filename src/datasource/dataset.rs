//! Rolling decimated dataset with cached bounds.

use crate::axis::Axis;
use crate::config::DatasetConfig;
use crate::datasource::DataError;
use crate::datasource::decimate::{BatchDecimator, StreamingDecimator};
use crate::datasource::listener::{ListenerId, ListenerSet, MinMaxChange};
use crate::datasource::swap::SwapAxes;
use crate::geom::Point;
use crate::sink::{LineBuffer, PointBuffer};
use crate::transform::BucketGrid;
use crate::view::{Range, Viewport};

/// A plotted series that decimates as it grows.
///
/// Points arrive through a streaming decimator (or are batch-compressed when
/// prepended), stale prefix data is dropped past the truncation point, and
/// per-axis min/max ranges are kept up to date over the raw input with
/// listeners notified when they move.
///
/// When an independent axis is set, its values must be appended in
/// non-decreasing order. A dataset without one (scatter data) stores points
/// unchanged and never truncates.
#[derive(Debug)]
pub struct RollingDataset<B: LineBuffer = PointBuffer> {
    buffer: B,
    independent_axis: Option<Axis>,
    grid: BucketGrid,
    decimator: Option<StreamingDecimator>,
    truncation_point: Option<f64>,
    truncation_offset: usize,
    x_range: Range,
    y_range: Range,
    x_listeners: ListenerSet,
    y_listeners: ListenerSet,
    generation: u64,
}

impl<B: LineBuffer> RollingDataset<B> {
    /// Create a dataset writing into `buffer`.
    ///
    /// Points already in the buffer are kept and included in the cached
    /// ranges.
    pub fn new(buffer: B, independent_axis: Option<Axis>) -> Self {
        let (x_range, y_range) = scan_ranges(&buffer);
        Self {
            buffer,
            independent_axis,
            grid: BucketGrid::unit(),
            decimator: None,
            truncation_point: None,
            truncation_offset: 0,
            x_range,
            y_range,
            x_listeners: ListenerSet::default(),
            y_listeners: ListenerSet::default(),
            generation: 0,
        }
    }

    /// Create a dataset without an independent axis; points are stored as given.
    pub fn scatter(buffer: B) -> Self {
        Self::new(buffer, None)
    }

    /// Create a dataset from a configuration.
    pub fn with_config(buffer: B, config: &DatasetConfig) -> Result<Self, DataError> {
        let grid = config.grid()?;
        let mut dataset = Self::new(buffer, config.independent_axis);
        dataset.grid = grid;
        dataset.truncation_point = config.truncation_point;
        dataset.truncation_offset = config.truncation_offset;
        Ok(dataset)
    }

    /// Append a point.
    ///
    /// Returns how many trailing points of the buffer were added or rewritten,
    /// which bounds the region to redraw.
    pub fn add(&mut self, x: f64, y: f64) -> usize {
        let before = self.ranges();
        let (_, modified) = self.push(Point::new(x, y));
        self.notify(before);
        modified
    }

    /// Append many points, notifying listeners at most once per axis.
    ///
    /// Returns how many trailing points of the buffer were added or rewritten.
    pub fn extend<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = Point>,
    {
        let before = self.ranges();
        let mut stable = self.buffer.len();
        for point in points {
            let (truncated, modified) = self.push(point);
            stable = stable
                .saturating_sub(truncated)
                .min(self.buffer.len() - modified);
        }
        self.notify(before);
        self.buffer.len() - stable
    }

    /// Compress and insert paired coordinates at the front.
    ///
    /// Mismatched lengths are rejected before anything changes. Returns the
    /// number of points inserted after compression.
    pub fn prepend(&mut self, xs: &[f64], ys: &[f64]) -> Result<usize, DataError> {
        if xs.len() != ys.len() {
            return Err(DataError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let points: Vec<Point> = xs.iter().zip(ys).map(|(&x, &y)| Point::new(x, y)).collect();
        Ok(self.prepend_points(&points))
    }

    /// Compress and insert points at the front.
    ///
    /// Cached ranges grow over the raw input. The truncation point is not
    /// applied to prepended data. Returns the number of points inserted.
    pub fn prepend_points(&mut self, points: &[Point]) -> usize {
        if points.is_empty() {
            return 0;
        }
        let before = self.ranges();
        let inserted = self.splice_front(points);
        self.notify(before);
        inserted
    }

    /// Remove every point and reset the cached ranges.
    pub fn remove_all_points(&mut self) {
        let before = self.ranges();
        self.reset();
        self.notify(before);
    }

    /// Remove up to `count` points from the front.
    pub fn remove_first(&mut self, count: usize) -> usize {
        let before = self.ranges();
        let removed = self.remove_front(count);
        self.notify(before);
        removed
    }

    /// Remove up to `count` points from the back of the buffer.
    ///
    /// Counts refer to buffer points, not to added samples: earlier adds may
    /// have merged several samples into fewer points. The streaming state is
    /// dropped, so the next add starts a fresh bucket.
    pub fn remove_last(&mut self, count: usize) -> usize {
        let len = self.buffer.len();
        let count = count.min(len);
        if count == 0 {
            return 0;
        }
        let before = self.ranges();
        let (hit_x, hit_y) = self.bound_hits(len - count..len);
        let removed = self.buffer.remove_last(count);
        self.decimator = None;
        self.rescan(End::Back, hit_x, hit_y);
        self.touch();
        self.notify(before);
        removed
    }

    /// Rebuild the buffer by compressing its current content under the
    /// current grid.
    ///
    /// The buffer holds already-decimated data, so each call compresses the
    /// output of the previous pass. Repeating it after changing the grid back
    /// and forth loses detail that cannot be recovered.
    pub fn recompress(&mut self) {
        let snapshot = self.buffer.to_points();
        let before = self.ranges();
        self.reset();
        let inserted = self.splice_front(&snapshot);
        tracing::debug!(
            "recompressed {} points into {} at scale {} (input was already decimated)",
            snapshot.len(),
            inserted,
            self.grid.scale()
        );
        self.notify(before);
    }

    /// Access the output buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Consume the dataset and return its buffer.
    pub fn into_buffer(self) -> B {
        self.buffer
    }

    /// Number of points in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Counter incremented by every call that changes the buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The independent axis, if any.
    pub fn independent_axis(&self) -> Option<Axis> {
        self.independent_axis
    }

    /// Minimum X value, or `+inf` when empty.
    pub fn min_x(&self) -> f64 {
        self.x_range.min
    }

    /// Maximum X value, or `-inf` when empty.
    pub fn max_x(&self) -> f64 {
        self.x_range.max
    }

    /// Minimum Y value, or `+inf` when empty.
    pub fn min_y(&self) -> f64 {
        self.y_range.min
    }

    /// Maximum Y value, or `-inf` when empty.
    pub fn max_y(&self) -> f64 {
        self.y_range.max
    }

    /// Cached X range.
    pub fn x_range(&self) -> Range {
        self.x_range
    }

    /// Cached Y range.
    pub fn y_range(&self) -> Range {
        self.y_range
    }

    /// Bounds on both axes, if any point is held.
    pub fn bounds(&self) -> Option<Viewport> {
        let viewport = Viewport::new(self.x_range, self.y_range);
        viewport.is_valid().then_some(viewport)
    }

    /// Bucket grid used for compression.
    pub fn grid(&self) -> BucketGrid {
        self.grid
    }

    /// Compression offset.
    pub fn compression_offset(&self) -> f64 {
        self.grid.offset()
    }

    /// Compression scale.
    pub fn compression_scale(&self) -> f64 {
        self.grid.scale()
    }

    /// Set the compression offset. Applies to points added from now on.
    pub fn set_compression_offset(&mut self, offset: f64) -> Result<(), DataError> {
        let grid = self.grid.with_offset(offset)?;
        self.set_grid(grid);
        Ok(())
    }

    /// Set the compression scale. Applies to points added from now on.
    pub fn set_compression_scale(&mut self, scale: f64) -> Result<(), DataError> {
        let grid = self.grid.with_scale(scale)?;
        self.set_grid(grid);
        Ok(())
    }

    /// Replace the compression grid; existing points are not recompressed.
    pub fn set_grid(&mut self, grid: BucketGrid) {
        if grid == self.grid {
            return;
        }
        tracing::debug!(
            "compression grid changed to offset {} scale {}",
            grid.offset(),
            grid.scale()
        );
        self.grid = grid;
        self.decimator = None;
    }

    /// Truncation point, if enabled.
    pub fn truncation_point(&self) -> Option<f64> {
        self.truncation_point
    }

    /// Drop prefix points whose independent coordinate is below `point` on
    /// every subsequent add.
    pub fn set_truncation_point(&mut self, point: f64) {
        self.truncation_point = Some(point);
    }

    /// Stop truncating.
    pub fn disable_truncation(&mut self) {
        self.truncation_point = None;
    }

    /// Number of points below the truncation point kept anyway.
    pub fn truncation_offset(&self) -> usize {
        self.truncation_offset
    }

    /// Set the number of points below the truncation point to keep.
    pub fn set_truncation_offset(&mut self, offset: usize) {
        self.truncation_offset = offset;
    }

    /// Register a listener for X range changes.
    pub fn add_x_min_max_listener(
        &mut self,
        listener: impl FnMut(&MinMaxChange) + 'static,
    ) -> ListenerId {
        self.x_listeners.add(listener)
    }

    /// Register a listener for Y range changes.
    pub fn add_y_min_max_listener(
        &mut self,
        listener: impl FnMut(&MinMaxChange) + 'static,
    ) -> ListenerId {
        self.y_listeners.add(listener)
    }

    /// Remove a listener from either axis. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.x_listeners.remove(id) || self.y_listeners.remove(id)
    }

    /// Remove every X range listener.
    pub fn remove_x_min_max_listeners(&mut self) {
        self.x_listeners.clear();
    }

    /// Remove every Y range listener.
    pub fn remove_y_min_max_listeners(&mut self) {
        self.y_listeners.clear();
    }

    fn ranges(&self) -> (Range, Range) {
        (self.x_range, self.y_range)
    }

    fn notify(&mut self, (x_before, y_before): (Range, Range)) {
        self.x_listeners.notify(Axis::X, x_before, self.x_range);
        self.y_listeners.notify(Axis::Y, y_before, self.y_range);
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Truncate, then feed one point. Returns (points truncated, points modified).
    fn push(&mut self, point: Point) -> (usize, usize) {
        let truncated = self.truncate();
        let modified = match self.independent_axis {
            None => {
                self.buffer.push_point(point);
                1
            }
            Some(axis) => {
                let grid = self.grid;
                let decimator = self
                    .decimator
                    .get_or_insert_with(|| StreamingDecimator::new(grid));
                let sample = axis.scan_order(point);
                match axis {
                    Axis::X => decimator.add(&mut self.buffer, sample),
                    Axis::Y => decimator.add(&mut SwapAxes::new(&mut self.buffer), sample),
                }
            }
        };
        self.x_range.expand_to_include(point.x);
        self.y_range.expand_to_include(point.y);
        self.touch();
        (truncated, modified)
    }

    fn splice_front(&mut self, points: &[Point]) -> usize {
        let inserted = match self.independent_axis {
            None => {
                self.buffer.prepend_points(points);
                points.len()
            }
            Some(axis) => {
                let decimator = BatchDecimator::new(self.grid);
                let mut compressed: Vec<Point> = Vec::new();
                let samples = points.iter().map(|&point| axis.scan_order(point));
                match axis {
                    Axis::X => decimator.decimate(samples, &mut compressed),
                    Axis::Y => decimator.decimate(samples, &mut SwapAxes::new(&mut compressed)),
                };
                self.buffer.prepend_points(&compressed);
                compressed.len()
            }
        };
        for point in points {
            self.x_range.expand_to_include(point.x);
            self.y_range.expand_to_include(point.y);
        }
        self.touch();
        inserted
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.decimator = None;
        self.x_range = Range::EMPTY;
        self.y_range = Range::EMPTY;
        self.touch();
    }

    /// Drop prefix points below the truncation point, keeping
    /// `truncation_offset` of them.
    fn truncate(&mut self) -> usize {
        let (Some(axis), Some(limit)) = (self.independent_axis, self.truncation_point) else {
            return 0;
        };
        // Few points go stale per add, so a front scan beats a binary search.
        let mut below = 0;
        while let Some(point) = self.buffer.point(below) {
            if axis.coordinate(point) >= limit {
                break;
            }
            below += 1;
        }
        let count = below.saturating_sub(self.truncation_offset);
        if count == 0 {
            return 0;
        }
        tracing::trace!("truncating {} points below {}", count, limit);
        self.remove_front(count)
    }

    fn remove_front(&mut self, count: usize) -> usize {
        let len = self.buffer.len();
        let count = count.min(len);
        if count == 0 {
            return 0;
        }
        let (hit_x, hit_y) = self.bound_hits(0..count);
        let work_in_progress = self
            .decimator
            .as_ref()
            .map_or(0, StreamingDecimator::work_in_progress);
        let persisted = len.saturating_sub(work_in_progress);
        let removed = self.buffer.remove_first(count);
        if removed > persisted {
            // The open bucket lost points it would rewrite on the next add.
            self.decimator = None;
        } else if let Some(decimator) = self.decimator.as_mut() {
            decimator.clamp_work_in_progress(self.buffer.len());
        }
        self.rescan(End::Front, hit_x, hit_y);
        self.touch();
        removed
    }

    /// Check whether any point in `indices` sits on a cached bound, per axis.
    fn bound_hits(&self, indices: std::ops::Range<usize>) -> (bool, bool) {
        let mut hit_x = false;
        let mut hit_y = false;
        for index in indices {
            if let Some(point) = self.buffer.point(index) {
                hit_x |= self.x_range.has_bound(point.x);
                hit_y |= self.y_range.has_bound(point.y);
            }
        }
        (hit_x, hit_y)
    }

    /// Recompute cached ranges after points were removed from `end`.
    ///
    /// An axis is rescanned only when a removed point sat on one of its
    /// bounds. The sorted independent axis is never rescanned: cached bounds
    /// come from raw samples while the buffer holds bucket coordinates, so
    /// the new end point only tightens the bound on the side that lost data.
    fn rescan(&mut self, end: End, hit_x: bool, hit_y: bool) {
        for (axis, hit) in [(Axis::X, hit_x), (Axis::Y, hit_y)] {
            let cached = match axis {
                Axis::X => self.x_range,
                Axis::Y => self.y_range,
            };
            let range = if self.independent_axis == Some(axis) {
                self.clip_independent(cached, axis, end)
            } else if hit {
                scan_axis(&self.buffer, axis)
            } else {
                continue;
            };
            match axis {
                Axis::X => self.x_range = range,
                Axis::Y => self.y_range = range,
            }
        }
    }

    /// Bound the independent range by the bucket at the end that lost points.
    ///
    /// Raw samples of a bucket lie between its coordinate and the next bucket
    /// boundary, so the result never excludes a retained raw value.
    fn clip_independent(&self, mut range: Range, axis: Axis, end: End) -> Range {
        let (Some(first), Some(last)) = (self.buffer.first(), self.buffer.last()) else {
            return Range::EMPTY;
        };
        let scale = self.grid.scale();
        let ascending = scale > 0.0;
        match end {
            End::Front => {
                let edge = axis.coordinate(first);
                if ascending {
                    range.min = range.min.max(edge);
                } else {
                    range.max = range.max.min(edge);
                }
            }
            End::Back => {
                let edge = axis.coordinate(last) + scale;
                if ascending {
                    range.max = range.max.min(edge);
                } else {
                    range.min = range.min.max(edge);
                }
            }
        }
        range
    }
}

/// Buffer end points were removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

impl Default for RollingDataset<PointBuffer> {
    fn default() -> Self {
        Self::new(PointBuffer::new(), Some(Axis::X))
    }
}

fn scan_axis<B: LineBuffer + ?Sized>(buffer: &B, axis: Axis) -> Range {
    let mut range = Range::EMPTY;
    for index in 0..buffer.len() {
        if let Some(point) = buffer.point(index) {
            range.expand_to_include(axis.coordinate(point));
        }
    }
    range
}

fn scan_ranges<B: LineBuffer + ?Sized>(buffer: &B) -> (Range, Range) {
    (scan_axis(buffer, Axis::X), scan_axis(buffer, Axis::Y))
}
