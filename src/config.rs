//! Dataset configuration.
//!
//! A [`DatasetConfig`] collects the knobs of a
//! [`RollingDataset`](crate::RollingDataset) so they can be kept in a TOML
//! file next to the rest of an application's settings:
//!
//! ```toml
//! independent_axis = "x"
//! compression_scale = 0.01
//! truncation_point = 120.0
//! truncation_offset = 2
//! ```
//!
//! `independent_axis = "none"` configures a scatter dataset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::datasource::DataError;
use crate::transform::BucketGrid;

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The text is not valid TOML for a dataset config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config could not be written as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value parsed but is out of range.
    #[error("invalid config: {0}")]
    Invalid(#[from] DataError),
}

/// Settings of one rolling dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Axis along which data arrives sorted; `None` for scatter data.
    #[serde(with = "axis_setting")]
    pub independent_axis: Option<Axis>,

    /// Coordinate of a bucket boundary.
    pub compression_offset: f64,

    /// Logical width of one bucket.
    pub compression_scale: f64,

    /// Independent coordinate below which prefix points are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation_point: Option<f64>,

    /// Points below the truncation point kept anyway.
    pub truncation_offset: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            independent_axis: Some(Axis::X),
            compression_offset: 0.0,
            compression_scale: 1.0,
            truncation_point: None,
            truncation_offset: 0,
        }
    }
}

impl DatasetConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.grid()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded dataset config from {:?}", path);
        Ok(config)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Validated bucket grid.
    pub fn grid(&self) -> Result<BucketGrid, DataError> {
        BucketGrid::new(self.compression_offset, self.compression_scale)
    }
}

/// `Option<Axis>` as `"x"`, `"y"` or `"none"`, since TOML has no null.
mod axis_setting {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::axis::Axis;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Setting {
        X,
        Y,
        #[serde(rename = "none")]
        Scatter,
    }

    pub(super) fn serialize<S: Serializer>(
        axis: &Option<Axis>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let setting = match axis {
            Some(Axis::X) => Setting::X,
            Some(Axis::Y) => Setting::Y,
            None => Setting::Scatter,
        };
        setting.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Axis>, D::Error> {
        Ok(match Setting::deserialize(deserializer)? {
            Setting::X => Some(Axis::X),
            Setting::Y => Some(Axis::Y),
            Setting::Scatter => None,
        })
    }
}
