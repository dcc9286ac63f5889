//! Output line buffers.
//!
//! Decimators only ever touch the ends of their output, so the sink contract
//! is small: append at the back, splice at the front, and drop runs from
//! either end. Rescans read points back by index.

use std::collections::VecDeque;

use crate::geom::Point;

/// Ordered point sink receiving decimated output.
pub trait LineBuffer {
    /// Number of points held.
    fn len(&self) -> usize;

    /// Access a point by index.
    fn point(&self, index: usize) -> Option<Point>;

    /// Append a point at the back.
    fn push_point(&mut self, point: Point);

    /// Insert a run of points at the front, keeping their order.
    fn prepend_points(&mut self, points: &[Point]);

    /// Remove up to `count` points from the back, returning how many were removed.
    fn remove_last(&mut self, count: usize) -> usize;

    /// Remove up to `count` points from the front, returning how many were removed.
    fn remove_first(&mut self, count: usize) -> usize;

    /// Check if there are no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First point, if any.
    fn first(&self) -> Option<Point> {
        self.point(0)
    }

    /// Last point, if any.
    fn last(&self) -> Option<Point> {
        self.len().checked_sub(1).and_then(|index| self.point(index))
    }

    /// Remove every point.
    fn clear(&mut self) {
        let len = self.len();
        self.remove_last(len);
    }

    /// Copy all points out in order.
    fn to_points(&self) -> Vec<Point> {
        (0..self.len()).filter_map(|index| self.point(index)).collect()
    }
}

/// Deque-backed line buffer with constant-time removal at both ends.
#[derive(Debug, Clone, Default)]
pub struct PointBuffer {
    points: VecDeque<Point>,
}

impl PointBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Iterate over the points in order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }
}

impl LineBuffer for PointBuffer {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    fn push_point(&mut self, point: Point) {
        self.points.push_back(point);
    }

    fn prepend_points(&mut self, points: &[Point]) {
        self.points.reserve(points.len());
        for point in points.iter().rev() {
            self.points.push_front(*point);
        }
    }

    fn remove_last(&mut self, count: usize) -> usize {
        let count = count.min(self.points.len());
        self.points.truncate(self.points.len() - count);
        count
    }

    fn remove_first(&mut self, count: usize) -> usize {
        let count = count.min(self.points.len());
        self.points.drain(..count);
        count
    }

    fn clear(&mut self) {
        self.points.clear();
    }
}

impl FromIterator<Point> for PointBuffer {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl LineBuffer for Vec<Point> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn point(&self, index: usize) -> Option<Point> {
        self.get(index).copied()
    }

    fn push_point(&mut self, point: Point) {
        self.push(point);
    }

    fn prepend_points(&mut self, points: &[Point]) {
        self.splice(0..0, points.iter().copied());
    }

    fn remove_last(&mut self, count: usize) -> usize {
        let count = count.min(Vec::len(self));
        self.truncate(Vec::len(self) - count);
        count
    }

    fn remove_first(&mut self, count: usize) -> usize {
        let count = count.min(Vec::len(self));
        self.drain(..count);
        count
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(f64, f64)]) -> Vec<Point> {
        values.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn point_buffer_edits_both_ends() {
        let mut buffer = PointBuffer::new();
        buffer.push_point(Point::new(2.0, 0.0));
        buffer.push_point(Point::new(3.0, 0.0));
        buffer.prepend_points(&points(&[(0.0, 0.0), (1.0, 0.0)]));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.first(), Some(Point::new(0.0, 0.0)));
        assert_eq!(buffer.last(), Some(Point::new(3.0, 0.0)));

        assert_eq!(buffer.remove_first(1), 1);
        assert_eq!(buffer.remove_last(10), 3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.last(), None);
    }

    #[test]
    fn vec_buffer_matches_point_buffer() {
        let mut vec: Vec<Point> = Vec::new();
        let mut deque = PointBuffer::new();
        let buffers: [&mut dyn LineBuffer; 2] = [&mut vec, &mut deque];
        for buffer in buffers {
            buffer.push_point(Point::new(5.0, 1.0));
            buffer.prepend_points(&points(&[(3.0, 1.0), (4.0, 2.0)]));
            buffer.push_point(Point::new(6.0, 3.0));
            buffer.remove_first(1);
            buffer.remove_last(1);
        }
        assert_eq!(vec, deque.to_points());
        assert_eq!(vec, points(&[(4.0, 2.0), (5.0, 1.0)]));
    }
}
