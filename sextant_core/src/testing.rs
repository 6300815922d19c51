// sextant_core/src/testing.rs

//! Shared helpers for unit tests: finite differences and seeded random poses.

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector, SMatrix, UnitQuaternion, Vector3, Vector4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::frames::Frame;
use crate::models::{ProjectionContext, ProjectionModel};
use crate::platform::{ImageSize, Intrinsics, SensorParams};

const STEP: f64 = 1e-6;

/// Central-difference Jacobian of `f` at `x`.
pub fn numerical_jacobian<F>(f: F, x: &DVector<f64>) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let rows = f(x).len();
    let mut jac = DMatrix::zeros(rows, x.len());
    for j in 0..x.len() {
        let mut plus = x.clone();
        let mut minus = x.clone();
        plus[j] += STEP;
        minus[j] -= STEP;
        let column = (f(&plus) - f(&minus)) / (2.0 * STEP);
        jac.column_mut(j).copy_from(&column);
    }
    jac
}

pub fn dmatrix<const R: usize, const C: usize>(m: &SMatrix<f64, R, C>) -> DMatrix<f64> {
    DMatrix::from_column_slice(R, C, m.as_slice())
}

pub fn dvector<const R: usize>(v: &SMatrix<f64, R, 1>) -> DVector<f64> {
    DVector::from_column_slice(v.as_slice())
}

pub fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0x5e7a)
}

pub fn random_frame(rng: &mut ChaCha8Rng, max_translation: f64) -> Frame {
    let t = Vector3::new(
        rng.gen_range(-max_translation..max_translation),
        rng.gen_range(-max_translation..max_translation),
        rng.gen_range(-max_translation..max_translation),
    );
    let rot = UnitQuaternion::from_euler_angles(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.0..3.0),
    );
    let q = rot.quaternion();
    Frame::new(t, Vector4::new(q.w, q.i, q.j, q.k))
}

/// Rebuilds a frame from a perturbed flat state, as finite differences need.
pub fn frame_from(x: &DVector<f64>) -> Frame {
    Frame::new(
        Vector3::new(x[0], x[1], x[2]),
        Vector4::new(x[3], x[4], x[5], x[6]),
    )
}

/// A robot a little off the world origin, yawed and slightly tilted.
pub fn robot_pose() -> Frame {
    let rot = UnitQuaternion::from_euler_angles(0.02, -0.03, 0.3);
    let q = rot.quaternion();
    Frame::new(Vector3::new(1.0, 2.0, 0.5), Vector4::new(q.w, q.i, q.j, q.k))
}

/// A camera mounted on the robot looking along the robot's x axis
/// (camera z forward, x right, y down).
pub fn forward_camera() -> Frame {
    Frame::new(
        Vector3::new(0.2, 0.0, 0.3),
        Vector4::new(0.5, -0.5, 0.5, -0.5),
    )
}

pub fn camera_params() -> SensorParams {
    SensorParams {
        intrinsics: Intrinsics::new(320.0, 240.0, 500.0, 500.0),
        distortion: vec![-0.1, 0.01],
        image_size: ImageSize::new(640.0, 480.0),
    }
}

/// Checks every Jacobian of `model` against central differences, on the
/// [`robot_pose`], [`forward_camera`] and [`camera_params`] fixtures.
pub fn assert_model_jacobians(model: &dyn ProjectionModel, landmark: &DVector<f64>) {
    let (robot, sensor, params) = (robot_pose(), forward_camera(), camera_params());
    let expect = |rf: &Frame, sf: &Frame, p: &SensorParams, l: &DVector<f64>| {
        let ctx = ProjectionContext {
            robot_frame: rf,
            sensor_frame: sf,
            params: p,
        };
        model.project(&ctx, l).unwrap().e
    };

    let out = {
        let ctx = ProjectionContext {
            robot_frame: &robot,
            sensor_frame: &sensor,
            params: &params,
        };
        model.project(&ctx, landmark).unwrap()
    };
    // Round-off in the differences grows with the magnitude of the expectation.
    let tol = 1e-8 * (1.0 + out.e.amax());

    let by_rf = numerical_jacobian(
        |x| expect(&frame_from(x), &sensor, &params, landmark),
        &dvector(&robot.state()),
    );
    let by_sf = numerical_jacobian(
        |x| expect(&robot, &frame_from(x), &params, landmark),
        &dvector(&sensor.state()),
    );
    let by_l = numerical_jacobian(|x| expect(&robot, &sensor, &params, x), landmark);
    let by_k = numerical_jacobian(
        |x| {
            let mut p = params.clone();
            p.intrinsics = Intrinsics::from_vector(&Vector4::from_column_slice(x.as_slice()));
            expect(&robot, &sensor, &p, landmark)
        },
        &dvector(&params.intrinsics.as_vector()),
    );
    let by_d = numerical_jacobian(
        |x| {
            let mut p = params.clone();
            p.distortion = x.as_slice().to_vec();
            expect(&robot, &sensor, &p, landmark)
        },
        &DVector::from_column_slice(&params.distortion),
    );

    assert_relative_eq!(out.e_rf, by_rf, epsilon = tol, max_relative = 1e-5);
    assert_relative_eq!(out.e_sf, by_sf, epsilon = tol, max_relative = 1e-5);
    assert_relative_eq!(out.e_l, by_l, epsilon = tol, max_relative = 1e-5);
    assert_relative_eq!(out.e_k, by_k, epsilon = tol, max_relative = 1e-5);
    assert_relative_eq!(out.e_d, by_d, epsilon = tol, max_relative = 1e-5);
}
