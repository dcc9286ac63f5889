//! Decimating data sources.
//!
//! Samples are compressed into per-bucket representative points as they
//! arrive, either in one batch or one at a time, and stored in a
//! [`LineBuffer`](crate::sink::LineBuffer). [`RollingDataset`] layers
//! truncation of stale data and cached min/max ranges on top.

mod dataset;
mod decimate;
mod interval;
mod listener;
mod swap;

pub use dataset::RollingDataset;
pub use decimate::{BatchDecimator, StreamingDecimator, decimate};
pub use interval::IntervalSet;
pub use listener::{ListenerId, MinMaxChange};
pub use swap::SwapAxes;

/// Errors raised by data source configuration and bulk input.
///
/// Every check happens before any state changes, so a rejected call leaves
/// the data source as it was.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DataError {
    /// Compression scale was zero, NaN or infinite.
    #[error("compression scale must be finite and non-zero, got {0}")]
    InvalidScale(f64),
    /// Compression offset was NaN or infinite.
    #[error("compression offset must be finite, got {0}")]
    InvalidOffset(f64),
    /// Paired coordinate slices differ in length.
    #[error("coordinate slices differ in length: {xs} x values, {ys} y values")]
    LengthMismatch {
        /// Number of X values.
        xs: usize,
        /// Number of Y values.
        ys: usize,
    },
}
