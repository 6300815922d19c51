// sextant_core/src/models/mod.rs

use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector, SMatrix, Vector6};
use std::fmt::Debug;

use crate::errors::ProjectionError;
use crate::frames::Frame;
use crate::platform::{ImageSize, SensorParams};
use crate::types::{LandmarkKind, SensorKind};

pub mod pinhole;
pub mod registry;
pub mod visibility;

pub use pinhole::SegmentProjection;
pub use registry::ModelRegistry;

/// The poses and calibration a projection model works with.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    /// Robot pose in the world.
    pub robot_frame: &'a Frame,
    /// Sensor mounting pose in the robot frame.
    pub sensor_frame: &'a Frame,
    pub params: &'a SensorParams,
}

/// What a projection model predicts for one landmark, with its Jacobians.
///
/// Jacobians are taken wrt the robot frame state (`e_rf`, m×7), the sensor frame
/// state (`e_sf`, m×7), the intrinsics `[u0, v0, au, av]` (`e_k`, m×4), the
/// distortion coefficients (`e_d`, m×nd) and the landmark state (`e_l`, m×L).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOutput {
    /// The predicted measurement.
    pub e: DVector<f64>,
    /// Depth (or range-like) measure of the landmark as seen by the sensor.
    pub depth: f64,
    pub e_rf: DMatrix<f64>,
    pub e_sf: DMatrix<f64>,
    pub e_k: DMatrix<f64>,
    pub e_d: DMatrix<f64>,
    pub e_l: DMatrix<f64>,
}

impl ProjectionOutput {
    /// Scales the expectation and every Jacobian by the same factor.
    pub fn scale(&mut self, factor: f64) {
        self.e *= factor;
        for jac in [
            &mut self.e_rf,
            &mut self.e_sf,
            &mut self.e_k,
            &mut self.e_d,
            &mut self.e_l,
        ] {
            *jac *= factor;
        }
    }
}

// --- PROJECTION MODEL TRAIT ---
// Represents how one sensor kind observes one landmark kind. `e = h(rf, sf, k, d, l)`
pub trait ProjectionModel: DynClone + Debug + Send + Sync {
    fn sensor_kind(&self) -> SensorKind;

    fn landmark_kind(&self) -> LandmarkKind;

    /// Dimension of the predicted measurement `e`.
    fn measurement_dim(&self) -> usize;

    /// Predicts the measurement of a landmark with state `landmark`.
    fn project(
        &self,
        ctx: &ProjectionContext,
        landmark: &DVector<f64>,
    ) -> Result<ProjectionOutput, ProjectionError>;

    /// Whether a predicted measurement would actually be observed.
    fn is_visible(&self, e: &DVector<f64>, depth: f64, image: &ImageSize) -> bool {
        visibility::is_visible(e, depth, image)
    }

    /// Projects a 3D segment `[P1; P2]` given in world coordinates.
    ///
    /// Only models of line landmarks provide this; the default returns `None`.
    fn project_segment(
        &self,
        ctx: &ProjectionContext,
        segment: &Vector6<f64>,
    ) -> Option<SegmentProjection> {
        let _ = (ctx, segment);
        None
    }
}

// This macro generates `Clone` for `Box<dyn ProjectionModel>`, so registries can be cloned.
dyn_clone::clone_trait_object!(ProjectionModel);

/// Copies a fixed-size Jacobian into the dynamic form used at trait boundaries.
pub(crate) fn dynamic<const R: usize, const C: usize>(m: &SMatrix<f64, R, C>) -> DMatrix<f64> {
    DMatrix::from_column_slice(R, C, m.as_slice())
}
