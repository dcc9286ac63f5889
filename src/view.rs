//! Value ranges and two-axis bounds.

/// Numeric range with inclusive bounds.
///
/// [`Range::EMPTY`] is the `(+inf, -inf)` sentinel used before any value has
/// been seen; including a value in it yields the degenerate range of that
/// value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// The empty range.
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Degenerate range holding a single value.
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Check whether the range holds no values.
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Check whether a value lies inside the closed range.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check whether two closed ranges overlap or share an endpoint.
    pub fn touches(&self, other: &Range) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Check whether a bound of the range equals the value exactly.
    pub fn has_bound(&self, value: f64) -> bool {
        self.min == value || self.max == value
    }

    /// Expand the range to include a value. Missing values are ignored.
    pub fn expand_to_include(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Smallest range covering both inputs.
    pub fn union(a: Self, b: Self) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Data ranges on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// X axis range.
    pub x: Range,
    /// Y axis range.
    pub y: Range,
}

impl Viewport {
    /// Create a viewport from X and Y ranges.
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Check whether both axes hold at least one value.
    pub fn is_valid(&self) -> bool {
        !self.x.is_empty() && !self.y.is_empty()
    }
}
