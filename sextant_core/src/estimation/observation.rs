// sextant_core/src/estimation/observation.rs

use nalgebra::{DMatrix, DVector, Matrix2, Vector2};

use crate::frames::FRAME_STATE_DIM;
use crate::landmarks::Landmark;
use crate::types::{LandmarkId, LandmarkKind, SensorId};

/// The actual measurement side of an observation. Filled by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub y: DVector<f64>,
    /// Measurement noise covariance. For line landmarks this is the 4×4 noise of
    /// the measured segment `[u1; v1; u2; v2]`.
    pub r: DMatrix<f64>,
}

/// The predicted measurement and its uncertainty.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub e: DVector<f64>,
    /// Depth of the landmark as seen by the sensor.
    pub depth: f64,
    /// `E = J P Jᵀ`, over every map state the expectation depends on.
    pub covariance: DMatrix<f64>,
    /// `det(E)`.
    pub uncertainty: f64,
}

/// Jacobians of the expectation, one block per upstream state.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationJacobians {
    /// Wrt the robot frame `[t; q]`.
    pub e_r: DMatrix<f64>,
    /// Wrt the sensor mounting frame `[t; q]`. Computed even when that frame is
    /// not part of the map.
    pub e_s: DMatrix<f64>,
    /// Wrt the landmark state.
    pub e_l: DMatrix<f64>,
}

/// One projected segment endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub mean: Vector2<f64>,
    /// Predicted covariance of the endpoint plus the matching block of the
    /// measurement noise.
    pub covariance: Matrix2<f64>,
}

/// What a line observation predicts besides the image line itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePrediction {
    pub endpoints: [Endpoint; 2],
    pub depths: Vector2<f64>,
    /// Visibility of the projected segment, before the engine's line visibility
    /// policy is applied.
    pub segment_visible: bool,
    /// Whether the infinite image line crosses the image at all, in front of the
    /// sensor.
    pub line_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ObservationPayload {
    #[default]
    Point,
    Line(LinePrediction),
}

/// The predicted observation of one landmark by one sensor.
///
/// An observation can be kept across filter cycles and re-projected in place:
/// projection rewrites everything except [`Observation::measurement`].
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub sensor: SensorId,
    pub landmark: LandmarkId,
    pub landmark_kind: LandmarkKind,
    pub visible: bool,
    pub measurement: Measurement,
    pub expectation: Expectation,
    pub jacobians: ObservationJacobians,
    pub payload: ObservationPayload,
}

impl Observation {
    /// An empty observation of `landmark` by `sensor`, with measurement noise `r`.
    /// Everything but the noise is zeroed until the first projection.
    pub fn new(sensor: SensorId, landmark: &Landmark, r: DMatrix<f64>) -> Self {
        Self {
            sensor,
            landmark: landmark.id,
            landmark_kind: landmark.kind,
            visible: false,
            measurement: Measurement {
                y: DVector::zeros(r.nrows()),
                r,
            },
            expectation: Expectation {
                e: DVector::zeros(0),
                depth: 0.0,
                covariance: DMatrix::zeros(0, 0),
                uncertainty: 0.0,
            },
            jacobians: ObservationJacobians {
                e_r: DMatrix::zeros(0, FRAME_STATE_DIM),
                e_s: DMatrix::zeros(0, FRAME_STATE_DIM),
                e_l: DMatrix::zeros(0, landmark.kind.state_dim()),
            },
            payload: ObservationPayload::Point,
        }
    }

    pub fn line(&self) -> Option<&LinePrediction> {
        match &self.payload {
            ObservationPayload::Line(line) => Some(line),
            ObservationPayload::Point => None,
        }
    }
}
