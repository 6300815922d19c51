// sextant_core/src/config.rs

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

/// How the visibility flag of a line observation is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineVisibilityPolicy {
    /// Line observations are always flagged visible. The computed segment
    /// visibility is still reported in the line payload.
    #[default]
    AlwaysVisible,
    /// The flag is the computed segment visibility.
    Computed,
}

/// Tunables of the [`ProjectionEngine`](crate::estimation::ProjectionEngine).
///
/// In TOML:
/// ```toml
/// line_visibility = "computed"
/// min_line_direction_norm = 1e-9
/// min_point_depth = 1e-6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub line_visibility: LineVisibilityPolicy,
    /// Image lines whose direction part `[a, b]` is shorter than this cannot be
    /// normalized and fail to project.
    pub min_line_direction_norm: f64,
    /// Points closer than this to the sensor's focal plane (in absolute depth)
    /// have no usable pixel and fail to project.
    pub min_point_depth: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_visibility: LineVisibilityPolicy::AlwaysVisible,
            min_line_direction_norm: 1e-12,
            min_point_depth: 1e-9,
        }
    }
}

impl EngineConfig {
    /// Loads a config from a TOML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading projection engine config from: {:?}", path);
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(path)))
    }

    /// Loads a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, threshold) in [
            ("min_line_direction_norm", self.min_line_direction_norm),
            ("min_point_depth", self.min_point_depth),
        ] {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {threshold}"),
                });
            }
        }
        Ok(())
    }
}
