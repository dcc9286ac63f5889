//! Axis-swap adapter for datasets scanned along Y.

use crate::geom::Point;
use crate::sink::LineBuffer;

/// Line buffer view with X and Y exchanged.
///
/// Decimators always treat `x` as the independent coordinate. Wrapping a sink
/// in `SwapAxes` and feeding swapped samples lets the same decimator scan a
/// dataset whose independent axis is Y.
#[derive(Debug)]
pub struct SwapAxes<'a, B: LineBuffer + ?Sized> {
    inner: &'a mut B,
}

impl<'a, B: LineBuffer + ?Sized> SwapAxes<'a, B> {
    /// Wrap a sink.
    pub fn new(inner: &'a mut B) -> Self {
        Self { inner }
    }
}

impl<B: LineBuffer + ?Sized> LineBuffer for SwapAxes<'_, B> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn point(&self, index: usize) -> Option<Point> {
        self.inner.point(index).map(Point::swapped)
    }

    fn push_point(&mut self, point: Point) {
        self.inner.push_point(point.swapped());
    }

    fn prepend_points(&mut self, points: &[Point]) {
        let swapped: Vec<Point> = points.iter().map(|point| point.swapped()).collect();
        self.inner.prepend_points(&swapped);
    }

    fn remove_last(&mut self, count: usize) -> usize {
        self.inner.remove_last(count)
    }

    fn remove_first(&mut self, count: usize) -> usize {
        self.inner.remove_first(count)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}
