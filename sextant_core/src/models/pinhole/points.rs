// sextant_core/src/models/pinhole/points.rs

use nalgebra::{DMatrix, DVector, Vector3, Vector4, Vector6};

use super::camera::project_point;
use super::check_landmark_dim;
use crate::errors::ProjectionError;
use crate::frames::transform::hmg_to_frame_with_jacobians;
use crate::landmarks::inverse_depth::idp_to_hmg;
use crate::models::{dynamic, ProjectionContext, ProjectionModel, ProjectionOutput};
use crate::types::{LandmarkKind, SensorKind};

/// Projects point landmarks of one parameterization through a pinhole camera.
///
/// Every point kind is first lifted to a homogeneous world point, so points at or
/// near infinity (inverse depth close to zero) project without blowing up. With a
/// depth channel, the expectation is `[u; v; depth]` instead of `[u; v]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinholePointModel {
    landmark: LandmarkKind,
    with_depth: bool,
}

impl PinholePointModel {
    /// A `pinHole` model. `landmark` must be a point kind.
    pub fn new(landmark: LandmarkKind) -> Self {
        Self {
            landmark,
            with_depth: false,
        }
    }

    /// A `pinHoleDepth` model. `landmark` must be a point kind.
    pub fn with_depth(landmark: LandmarkKind) -> Self {
        Self {
            landmark,
            with_depth: true,
        }
    }

    /// The homogeneous world point `h_W` and its Jacobian wrt the landmark state (4×L).
    fn lift(&self, l: &DVector<f64>) -> Result<(Vector4<f64>, DMatrix<f64>), ProjectionError> {
        match self.landmark {
            LandmarkKind::EuclideanPoint => {
                let mut h_l = DMatrix::zeros(4, 3);
                h_l.fill_diagonal(1.0);
                Ok((Vector4::new(l[0], l[1], l[2], 1.0), h_l))
            }
            LandmarkKind::HomogeneousPoint => Ok((
                Vector4::from_column_slice(l.as_slice()),
                DMatrix::identity(4, 4),
            )),
            LandmarkKind::InverseDepthPoint => {
                let (h, h_idp) = idp_to_hmg(&Vector6::from_column_slice(l.as_slice()));
                Ok((h, dynamic(&h_idp)))
            }
            LandmarkKind::PluckerLine => Err(ProjectionError::UnknownLandmarkType {
                sensor: self.sensor_kind().to_string(),
                landmark: self.landmark.to_string(),
            }),
        }
    }
}

impl ProjectionModel for PinholePointModel {
    fn sensor_kind(&self) -> SensorKind {
        if self.with_depth {
            SensorKind::PinholeDepth
        } else {
            SensorKind::Pinhole
        }
    }

    fn landmark_kind(&self) -> LandmarkKind {
        self.landmark
    }

    fn measurement_dim(&self) -> usize {
        if self.with_depth {
            3
        } else {
            2
        }
    }

    fn project(
        &self,
        ctx: &ProjectionContext,
        landmark: &DVector<f64>,
    ) -> Result<ProjectionOutput, ProjectionError> {
        check_landmark_dim(self.landmark, landmark.len())?;
        let (h_w, hw_l) = self.lift(landmark)?;

        // World -> robot -> sensor, staying homogeneous throughout.
        let (h_r, hr_rf, hr_hw) = hmg_to_frame_with_jacobians(ctx.robot_frame, &h_w);
        let (h_s, hs_sf, hs_hr) = hmg_to_frame_with_jacobians(ctx.sensor_frame, &h_r);

        let m = Vector3::new(h_s.x, h_s.y, h_s.z);
        let rho = h_s.w;
        // The pixel only depends on the ratios of m, so rho drops out of it.
        let px = project_point(&m, &ctx.params.intrinsics, &ctx.params.distortion);
        let depth = m.z / rho;

        let dim = self.measurement_dim();
        let nd = ctx.params.distortion.len();
        let mut e = DVector::zeros(dim);
        let mut e_hs = DMatrix::zeros(dim, 4);
        let mut e_k = DMatrix::zeros(dim, 4);
        let mut e_d = DMatrix::zeros(dim, nd);

        e.fixed_rows_mut::<2>(0).copy_from(&px.pixel);
        e_hs.view_mut((0, 0), (2, 3)).copy_from(&px.u_p);
        e_k.view_mut((0, 0), (2, 4)).copy_from(&px.u_k);
        e_d.view_mut((0, 0), (2, nd)).copy_from(&px.u_d);
        if self.with_depth {
            e[2] = depth;
            e_hs[(2, 2)] = 1.0 / rho;
            e_hs[(2, 3)] = -m.z / (rho * rho);
        }

        let e_hr = &e_hs * dynamic(&hs_hr);
        Ok(ProjectionOutput {
            e_rf: &e_hr * dynamic(&hr_rf),
            e_sf: &e_hs * dynamic(&hs_sf),
            e_l: e_hr * dynamic(&hr_hw) * hw_l,
            e,
            depth,
            e_k,
            e_d,
        })
    }
}
