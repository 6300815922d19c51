// sextant_core/src/landmarks/inverse_depth.rs

//! Inverse-depth points `[x0; yaw; pitch; rho]`: the point seen from anchor `x0`
//! along bearing `m(yaw, pitch)` at distance `1 / rho`.

use nalgebra::{Matrix3, Matrix3x2, Matrix4x6, Vector2, Vector3, Vector4, Vector6};

/// Unit bearing for the given yaw and pitch angles, and its 3×2 Jacobian.
pub fn bearing(yaw_pitch: &Vector2<f64>) -> (Vector3<f64>, Matrix3x2<f64>) {
    let (sy, cy) = yaw_pitch[0].sin_cos();
    let (sp, cp) = yaw_pitch[1].sin_cos();

    let m = Vector3::new(cp * cy, cp * sy, sp);
    let m_py = Matrix3x2::new(
        -cp * sy, -sp * cy, //
        cp * cy, -sp * sy, //
        0.0, cp,
    );
    (m, m_py)
}

/// Converts to the homogeneous point `[x0 rho + m; rho]`, with Jacobian (4×6).
///
/// The homogeneous form stays finite as `rho → 0`, which is why projection goes
/// through it instead of through Euclidean coordinates.
pub fn idp_to_hmg(idp: &Vector6<f64>) -> (Vector4<f64>, Matrix4x6<f64>) {
    let x0 = idp.fixed_rows::<3>(0).into_owned();
    let rho = idp[5];
    let (m, m_py) = bearing(&Vector2::new(idp[3], idp[4]));

    let head = x0 * rho + m;
    let h = Vector4::new(head.x, head.y, head.z, rho);

    let mut h_idp = Matrix4x6::zeros();
    h_idp.fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(Matrix3::identity() * rho));
    h_idp.fixed_view_mut::<3, 2>(0, 3).copy_from(&m_py);
    h_idp.fixed_view_mut::<3, 1>(0, 5).copy_from(&x0);
    h_idp[(3, 5)] = 1.0;

    (h, h_idp)
}

/// Euclidean position `x0 + m / rho`. Undefined for `rho = 0`.
pub fn idp_to_euclidean(idp: &Vector6<f64>) -> Vector3<f64> {
    let (m, _) = bearing(&Vector2::new(idp[3], idp[4]));
    idp.fixed_rows::<3>(0) + m / idp[5]
}
