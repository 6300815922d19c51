// sextant_core/src/platform.rs

use nalgebra::{Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::errors::ProjectionError;
use crate::frames::{Frame, FRAME_STATE_DIM};
use crate::mapping::MapView;
use crate::types::{RobotId, SensorId, SensorKind};

/// Pinhole intrinsics: principal point `(u0, v0)` and focal lengths in pixels `(au, av)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub u0: f64,
    pub v0: f64,
    pub au: f64,
    pub av: f64,
}

impl Intrinsics {
    pub fn new(u0: f64, v0: f64, au: f64, av: f64) -> Self {
        Self { u0, v0, au, av }
    }

    /// The flat `k = [u0, v0, au, av]` used as the column order of intrinsic Jacobians.
    pub fn as_vector(&self) -> Vector4<f64> {
        Vector4::new(self.u0, self.v0, self.au, self.av)
    }

    pub fn from_vector(k: &Vector4<f64>) -> Self {
        Self::new(k[0], k[1], k[2], k[3])
    }

    pub fn principal_point(&self) -> Vector2<f64> {
        Vector2::new(self.u0, self.v0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether a pixel lies inside the image rectangle, borders included.
    pub fn contains(&self, pixel: &Vector2<f64>) -> bool {
        (0.0..=self.width).contains(&pixel.x) && (0.0..=self.height).contains(&pixel.y)
    }
}

/// Everything a projection model needs to know about a sensor besides its pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorParams {
    pub intrinsics: Intrinsics,
    /// Radial distortion coefficients `d1, d2, ...` applied as `1 + d1 r² + d2 r⁴ + ...`.
    #[serde(default)]
    pub distortion: Vec<f64>,
    pub image_size: ImageSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    pub id: RobotId,
    /// Pose of the robot in the world frame.
    pub frame: Frame,
    /// Map indices of the robot frame state `[t; q]`.
    pub frame_range: Range<usize>,
}

impl Robot {
    pub fn new(id: RobotId, frame: Frame, start: usize) -> Self {
        Self {
            id,
            frame,
            frame_range: start..start + FRAME_STATE_DIM,
        }
    }

    /// Refreshes the cached frame from the current map mean.
    pub fn sync_frame(&mut self, map: &MapView) -> Result<(), ProjectionError> {
        let x = map.mean(&self.frame_range, || format!("robot {:?}", self.id))?;
        self.frame = Frame::from_state(x.as_slice())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub id: SensorId,
    pub kind: SensorKind,
    /// The robot this sensor is mounted on.
    pub robot: RobotId,
    /// Mounting pose of the sensor in its robot's frame.
    pub frame: Frame,
    /// Map indices of the mounting pose, when it is estimated by the filter.
    pub frame_range: Option<Range<usize>>,
    pub params: SensorParams,
}

impl Sensor {
    /// A sensor with a fixed, calibrated mounting pose.
    pub fn fixed(id: SensorId, kind: SensorKind, robot: RobotId, frame: Frame, params: SensorParams) -> Self {
        Self {
            id,
            kind,
            robot,
            frame,
            frame_range: None,
            params,
        }
    }

    /// A sensor whose mounting pose is part of the map, starting at index `start`.
    pub fn in_map(
        id: SensorId,
        kind: SensorKind,
        robot: RobotId,
        frame: Frame,
        params: SensorParams,
        start: usize,
    ) -> Self {
        Self {
            frame_range: Some(start..start + FRAME_STATE_DIM),
            ..Self::fixed(id, kind, robot, frame, params)
        }
    }

    pub fn frame_in_map(&self) -> bool {
        self.frame_range.is_some()
    }

    /// Refreshes the cached mounting frame from the map. A no-op for fixed sensors.
    pub fn sync_frame(&mut self, map: &MapView) -> Result<(), ProjectionError> {
        if let Some(range) = &self.frame_range {
            let x = map.mean(range, || format!("sensor {:?}", self.id))?;
            self.frame = Frame::from_state(x.as_slice())?;
        }
        Ok(())
    }
}
