// sextant_core/src/models/pinhole/lines.rs

use nalgebra::{DMatrix, DVector, Matrix3x6, Matrix4, Matrix4x6, Vector2, Vector3, Vector4, Vector6};

use super::camera::{project_moment, project_point};
use super::check_landmark_dim;
use crate::errors::ProjectionError;
use crate::frames::segment::segment_to_frame;
use crate::frames::transform::plucker_to_frame_with_jacobians;
use crate::frames::FrameJacobian;
use crate::models::{dynamic, ProjectionContext, ProjectionModel, ProjectionOutput};
use crate::platform::ImageSize;
use crate::types::{LandmarkKind, SensorKind};

/// Projects Plücker lines through a pinhole camera.
///
/// The expectation is the homogeneous image line `l = K_L n_S`, left unnormalized.
/// Its depth is the distance from the camera to the 3D line. Lens distortion does
/// not map lines to lines and is ignored here, so `e_d` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinholeLineModel;

/// A 3D segment projected through a camera.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProjection {
    /// `[u1; v1; u2; v2]`.
    pub endpoints: Vector4<f64>,
    /// Depth of each endpoint along the optical axis.
    pub depths: Vector2<f64>,
    pub s_rf: FrameJacobian<4>,
    pub s_sf: FrameJacobian<4>,
    /// Wrt `[u0, v0, au, av]`.
    pub s_k: Matrix4<f64>,
    /// Wrt the world segment `[P1; P2]`. Block diagonal: each endpoint only moves its own pixel.
    pub s_seg: Matrix4x6<f64>,
}

impl ProjectionModel for PinholeLineModel {
    fn sensor_kind(&self) -> SensorKind {
        SensorKind::Pinhole
    }

    fn landmark_kind(&self) -> LandmarkKind {
        LandmarkKind::PluckerLine
    }

    fn measurement_dim(&self) -> usize {
        3
    }

    fn project(
        &self,
        ctx: &ProjectionContext,
        landmark: &DVector<f64>,
    ) -> Result<ProjectionOutput, ProjectionError> {
        check_landmark_dim(LandmarkKind::PluckerLine, landmark.len())?;
        let line = Vector6::from_column_slice(landmark.as_slice());

        let (l_r, lr_rf, lr_l) = plucker_to_frame_with_jacobians(ctx.robot_frame, &line);
        let (l_s, ls_sf, ls_lr) = plucker_to_frame_with_jacobians(ctx.sensor_frame, &l_r);

        let n_s: Vector3<f64> = l_s.fixed_rows::<3>(0).into_owned();
        let v_s: Vector3<f64> = l_s.fixed_rows::<3>(3).into_owned();
        let (e, e_n, e_k) = project_moment(&n_s, &ctx.params.intrinsics);

        // Only the moment reaches the image.
        let mut e_ls = Matrix3x6::zeros();
        e_ls.fixed_columns_mut::<3>(0).copy_from(&e_n);
        let e_lr = e_ls * ls_lr;

        Ok(ProjectionOutput {
            e: DVector::from_column_slice(e.as_slice()),
            depth: n_s.norm() / v_s.norm(),
            e_rf: dynamic(&(e_lr * lr_rf)),
            e_sf: dynamic(&(e_ls * ls_sf)),
            e_k: dynamic(&e_k),
            e_d: DMatrix::zeros(3, ctx.params.distortion.len()),
            e_l: dynamic(&(e_lr * lr_l)),
        })
    }

    /// A line is visible when it lies at positive distance and crosses the image,
    /// that is when the image corners are not all on the same side of it.
    fn is_visible(&self, e: &DVector<f64>, depth: f64, image: &ImageSize) -> bool {
        if e.len() < 3 || depth <= 0.0 {
            return false;
        }
        let l = Vector3::new(e[0], e[1], e[2]);
        let corners = [
            (0.0, 0.0),
            (image.width, 0.0),
            (0.0, image.height),
            (image.width, image.height),
        ]
        .map(|(u, v)| l.dot(&Vector3::new(u, v, 1.0)));
        let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        lo <= 0.0 && hi >= 0.0
    }

    fn project_segment(
        &self,
        ctx: &ProjectionContext,
        segment: &Vector6<f64>,
    ) -> Option<SegmentProjection> {
        let (s_r, sr_rf, sr_s) = segment_to_frame(ctx.robot_frame, segment);
        let (s_s, ss_sf, ss_sr) = segment_to_frame(ctx.sensor_frame, &s_r);

        let mut endpoints = Vector4::zeros();
        let mut depths = Vector2::zeros();
        let mut s_k = Matrix4::zeros();
        let mut u_ss = Matrix4x6::zeros();
        for i in 0..2 {
            let p: Vector3<f64> = s_s.fixed_rows::<3>(3 * i).into_owned();
            let px = project_point(&p, &ctx.params.intrinsics, &[]);
            endpoints.fixed_rows_mut::<2>(2 * i).copy_from(&px.pixel);
            depths[i] = p.z;
            s_k.fixed_rows_mut::<2>(2 * i).copy_from(&px.u_k);
            u_ss.fixed_view_mut::<2, 3>(2 * i, 3 * i).copy_from(&px.u_p);
        }

        let u_sr = u_ss * ss_sr;
        Some(SegmentProjection {
            endpoints,
            depths,
            s_rf: u_sr * sr_rf,
            s_sf: u_ss * ss_sf,
            s_k,
            s_seg: u_sr * sr_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frame;
    use crate::landmarks::plucker::{plucker_from_points, plucker_segment};
    use crate::platform::{Intrinsics, SensorParams};
    use crate::testing::{
        assert_model_jacobians, camera_params, dmatrix, dvector, forward_camera, frame_from,
        numerical_jacobian, robot_pose,
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// A line about five meters ahead of the fixture robot, crossing the view diagonally.
    fn line_ahead() -> Vector6<f64> {
        plucker_from_points(&Vector3::new(6.0, 1.0, 0.0), &Vector3::new(6.5, 3.0, 1.5))
    }

    #[test]
    fn jacobians_match_finite_differences() {
        assert_model_jacobians(&PinholeLineModel, &dvector(&line_ahead()));
    }

    #[test]
    fn segment_endpoints_lie_on_the_projected_line() {
        let (robot, sensor, mut params) = (robot_pose(), forward_camera(), camera_params());
        params.distortion.clear();
        let ctx = ProjectionContext {
            robot_frame: &robot,
            sensor_frame: &sensor,
            params: &params,
        };
        let line = line_ahead();
        let (segment, _) = plucker_segment(&line, [-1.0, 1.5]);

        let out = PinholeLineModel.project(&ctx, &dvector(&line)).unwrap();
        let proj = PinholeLineModel.project_segment(&ctx, &segment).unwrap();
        let l = Vector3::from_column_slice(out.e.as_slice()).normalize();
        for i in 0..2 {
            let px = Vector3::new(proj.endpoints[2 * i], proj.endpoints[2 * i + 1], 1.0);
            assert_abs_diff_eq!(l.dot(&px), 0.0, epsilon = 1e-6);
            assert!(proj.depths[i] > 0.0);
        }
        assert!(PinholeLineModel.is_visible(&out.e, out.depth, &params.image_size));
    }

    #[test]
    fn segment_jacobians_match_finite_differences() {
        let (robot, sensor, params) = (robot_pose(), forward_camera(), camera_params());
        let (segment, _) = plucker_segment(&line_ahead(), [-1.0, 1.5]);
        let project = |rf: &Frame, sf: &Frame, p: &SensorParams, s: &Vector6<f64>| {
            let ctx = ProjectionContext {
                robot_frame: rf,
                sensor_frame: sf,
                params: p,
            };
            PinholeLineModel.project_segment(&ctx, s).unwrap()
        };
        let proj = project(&robot, &sensor, &params, &segment);

        let by_rf = numerical_jacobian(
            |x| dvector(&project(&frame_from(x), &sensor, &params, &segment).endpoints),
            &dvector(&robot.state()),
        );
        let by_sf = numerical_jacobian(
            |x| dvector(&project(&robot, &frame_from(x), &params, &segment).endpoints),
            &dvector(&sensor.state()),
        );
        let by_seg = numerical_jacobian(
            |x| dvector(&project(&robot, &sensor, &params, &Vector6::from_column_slice(x.as_slice())).endpoints),
            &dvector(&segment),
        );
        let by_k = numerical_jacobian(
            |x| {
                let mut p = params.clone();
                p.intrinsics = Intrinsics::from_vector(&Vector4::from_column_slice(x.as_slice()));
                dvector(&project(&robot, &sensor, &p, &segment).endpoints)
            },
            &dvector(&params.intrinsics.as_vector()),
        );

        assert_relative_eq!(dmatrix(&proj.s_rf), by_rf, epsilon = 1e-5, max_relative = 1e-5);
        assert_relative_eq!(dmatrix(&proj.s_sf), by_sf, epsilon = 1e-5, max_relative = 1e-5);
        assert_relative_eq!(dmatrix(&proj.s_seg), by_seg, epsilon = 1e-5, max_relative = 1e-5);
        assert_relative_eq!(dmatrix(&proj.s_k), by_k, epsilon = 1e-5, max_relative = 1e-5);

        // Each endpoint's pixel only depends on that endpoint.
        assert_eq!(proj.s_seg.fixed_view::<2, 3>(0, 3).abs().max(), 0.0);
        assert_eq!(proj.s_seg.fixed_view::<2, 3>(2, 0).abs().max(), 0.0);
    }

    #[test]
    fn lines_missing_the_image_are_not_visible() {
        let image = camera_params().image_size;
        // The horizontal line v = -100, above the image.
        let above = DVector::from_vec(vec![0.0, 1.0, 100.0]);
        assert!(!PinholeLineModel.is_visible(&above, 4.0, &image));
        // v = 100 crosses it, unless the line is behind the camera.
        let across = DVector::from_vec(vec![0.0, 1.0, -100.0]);
        assert!(PinholeLineModel.is_visible(&across, 4.0, &image));
        assert!(!PinholeLineModel.is_visible(&across, -4.0, &image));
    }
}
