//! Geometric primitives used by the decimation pipeline.
//!
//! Points are data-space coordinates. A NaN coordinate on the dependent axis
//! marks a gap in the line rather than a value.

/// Sentinel for "no line exists at this coordinate".
///
/// Any NaN is treated as missing; this constant is the one the crate emits.
pub const MISSING: f64 = f64::NAN;

/// Check whether a value is the missing sentinel.
#[inline]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Exact equality where two missing values compare equal.
#[inline]
pub fn same_value(a: f64, b: f64) -> bool {
    a == b || (is_missing(a) && is_missing(b))
}

/// A point in data space.
///
/// Within a decimator `x` is the independent coordinate and `y` the dependent
/// one; the axis-swap adapter takes care of datasets scanned along Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a gap marker at the given X coordinate.
    pub fn gap(x: f64) -> Self {
        Self { x, y: MISSING }
    }

    /// Return the point with both coordinates exchanged.
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    /// Check whether the dependent coordinate is missing.
    pub fn is_gap(&self) -> bool {
        is_missing(self.y)
    }

    /// Compare two points, treating missing coordinates as equal.
    pub fn same_as(&self, other: &Point) -> bool {
        same_value(self.x, other.x) && same_value(self.y, other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
