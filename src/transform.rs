//! Mapping from data coordinates onto the pixel bucket grid.

use serde::{Deserialize, Serialize};

use crate::datasource::DataError;

/// Fixed-width bucket grid along the independent axis.
///
/// `scale` is the logical width of one pixel and `offset` the logical
/// coordinate of a bucket boundary. Bucket `b` covers
/// `[b * scale + offset, (b + 1) * scale + offset)`. A negative scale lays the
/// grid out for data arriving in decreasing order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid", into = "RawGrid")]
pub struct BucketGrid {
    offset: f64,
    scale: f64,
}

impl BucketGrid {
    /// Create a grid, rejecting a zero or non-finite scale and a non-finite offset.
    pub fn new(offset: f64, scale: f64) -> Result<Self, DataError> {
        if !offset.is_finite() {
            return Err(DataError::InvalidOffset(offset));
        }
        if !scale.is_finite() || scale == 0.0 {
            return Err(DataError::InvalidScale(scale));
        }
        Ok(Self { offset, scale })
    }

    /// One bucket per logical unit, aligned at zero.
    pub fn unit() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// Grid offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Grid scale (logical width of one bucket).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Index of the bucket containing a coordinate.
    pub fn bucket_index(&self, value: f64) -> f64 {
        ((value - self.offset) / self.scale).floor()
    }

    /// Coordinate every point of a bucket is emitted at.
    pub fn bucket_start(&self, index: f64) -> f64 {
        index * self.scale + self.offset
    }

    /// First coordinate past the end of a bucket.
    pub fn bucket_end(&self, index: f64) -> f64 {
        (index + 1.0) * self.scale + self.offset
    }

    /// Return a grid with a different offset.
    pub fn with_offset(self, offset: f64) -> Result<Self, DataError> {
        Self::new(offset, self.scale)
    }

    /// Return a grid with a different scale.
    pub fn with_scale(self, scale: f64) -> Result<Self, DataError> {
        Self::new(self.offset, scale)
    }
}

impl Default for BucketGrid {
    fn default() -> Self {
        Self::unit()
    }
}

#[derive(Serialize, Deserialize)]
struct RawGrid {
    offset: f64,
    scale: f64,
}

impl TryFrom<RawGrid> for BucketGrid {
    type Error = DataError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Self::new(raw.offset, raw.scale)
    }
}

impl From<BucketGrid> for RawGrid {
    fn from(grid: BucketGrid) -> Self {
        Self {
            offset: grid.offset,
            scale: grid.scale,
        }
    }
}
