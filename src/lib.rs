//! liveplot_decimate compresses streaming line data for plotting.
//!
//! Samples are reduced to a few representative points per pixel bucket, so a
//! line of millions of samples draws with the same pixels at a fraction of the
//! cost. Both one-shot and incremental decimation are provided, along with a
//! rolling dataset that drops stale data and tracks its own bounds.

#![forbid(unsafe_code)]

pub mod axis;
pub mod config;
pub mod datasource;
pub mod geom;
pub mod sink;
pub mod transform;
pub mod view;

pub use axis::Axis;
pub use config::{ConfigError, DatasetConfig};
pub use datasource::{
    BatchDecimator, DataError, IntervalSet, ListenerId, MinMaxChange, RollingDataset,
    StreamingDecimator, SwapAxes, decimate,
};
pub use geom::{MISSING, Point, is_missing};
pub use sink::{LineBuffer, PointBuffer};
pub use transform::BucketGrid;
pub use view::{Range, Viewport};
