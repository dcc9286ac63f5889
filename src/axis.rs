//! Axis selection for datasets.

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// One of the two plot axes.
///
/// A dataset names its independent axis with this type; the bucket grid is
/// laid along it and its values must stay sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    /// The other axis.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Read this axis' coordinate from a point.
    pub fn coordinate(self, point: Point) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }

    /// Reorder a point so that this axis becomes the scan (X) coordinate.
    pub fn scan_order(self, point: Point) -> Point {
        match self {
            Self::X => point,
            Self::Y => point.swapped(),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}
