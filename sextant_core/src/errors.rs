// sextant_core/src/errors.rs

use std::ops::Range;
use thiserror::Error;

use crate::types::{LandmarkId, RobotId, SensorId};

/// Everything that can abort the projection of one (sensor, landmark) pair.
///
/// None of these are transient: the caller may skip the pair and carry on with
/// the others, but retrying the same call will fail the same way.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// No projection model at all is registered for this sensor kind.
    #[error("unknown sensor type '{sensor}' (while projecting landmark type '{landmark}')")]
    UnknownSensorType { sensor: String, landmark: String },

    /// The sensor kind is known but cannot observe this landmark kind.
    #[error("unknown landmark type '{landmark}' for sensor type '{sensor}'")]
    UnknownLandmarkType { sensor: String, landmark: String },

    /// A type name that does not correspond to any known kind.
    #[error("unknown {category} type '{name}'")]
    UnknownTypeName { category: &'static str, name: String },

    /// The homogeneous image line has a (near) zero direction part and cannot be normalized.
    #[error("degenerate image line for landmark {landmark:?}: direction norm {norm:e} is below {threshold:e}")]
    DegenerateLine {
        landmark: LandmarkId,
        norm: f64,
        threshold: f64,
    },

    /// The point lies on (or numerically at) the sensor's focal plane, so it has no pixel.
    #[error("degenerate point for landmark {landmark:?}: depth {depth:e} is within {threshold:e} of the focal plane")]
    DegeneratePoint {
        landmark: LandmarkId,
        depth: f64,
        threshold: f64,
    },

    /// Two of the state blocks a projection reads share map indices.
    #[error("state range {first_range:?} of {first} overlaps {second_range:?} of {second}")]
    OverlappingRanges {
        first: String,
        first_range: Range<usize>,
        second: String,
        second_range: Range<usize>,
    },

    #[error("state range {range:?} of {owner} does not fit in a map of dimension {dim}")]
    RangeOutOfBounds {
        owner: String,
        range: Range<usize>,
        dim: usize,
    },

    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("sensor {sensor:?} is mounted on robot {mounted_on:?}, not on robot {robot:?}")]
    SensorNotOnRobot {
        sensor: SensorId,
        mounted_on: RobotId,
        robot: RobotId,
    },

    /// The model projects the line itself but cannot project its finite segment.
    #[error("sensor type '{sensor}' cannot project segments of landmark type '{landmark}'")]
    SegmentProjectionUnsupported { sensor: String, landmark: String },

    #[error("line landmark {0:?} carries no endpoint parameters")]
    MissingLineParams(LandmarkId),
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}
