// sextant_core/src/frames/quaternion.rs

//! Quaternion helpers in the `[w, x, y, z]` convention used by frame states.
//!
//! Rotation matrices use the homogeneous quadratic form
//! `R = (w² − vᵀv) I + 2 v vᵀ + 2 w [v]×`, so the Jacobians below are exact for
//! any `q`, not only on the unit sphere.

use nalgebra::{Matrix3, Matrix3x4, Matrix4x3, Vector3, Vector4};

pub fn conjugate(q: &Vector4<f64>) -> Vector4<f64> {
    Vector4::new(q[0], -q[1], -q[2], -q[3])
}

pub fn rotation_matrix(q: &Vector4<f64>) -> Matrix3<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    Matrix3::new(
        w * w + x * x - y * y - z * z,
        2.0 * (x * y - w * z),
        2.0 * (x * z + w * y),
        2.0 * (x * y + w * z),
        w * w - x * x + y * y - z * z,
        2.0 * (y * z - w * x),
        2.0 * (x * z - w * y),
        2.0 * (y * z + w * x),
        w * w - x * x - y * y + z * z,
    )
}

/// `Pi(q)` with `q ⊗ [0; w] = Pi(q) w`.
pub fn pi_matrix(q: &Vector4<f64>) -> Matrix4x3<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    Matrix4x3::new(
        -x, -y, -z, //
        w, -z, y, //
        z, w, -x, //
        -y, x, w,
    )
}

/// Jacobian of `R(q) a` with respect to `q`.
pub fn rotate_jacobian_q(q: &Vector4<f64>, a: &Vector3<f64>) -> Matrix3x4<f64> {
    rotation_jacobian_from_product(&(pi_matrix(q) * a))
}

/// Jacobian of `R(q)ᵀ a` with respect to `q`.
///
/// `R(q)ᵀ = R(q*)`, so this is the conjugate Jacobian with the vector part negated.
pub fn rotate_transpose_jacobian_q(q: &Vector4<f64>, a: &Vector3<f64>) -> Matrix3x4<f64> {
    conjugate_columns(rotation_jacobian_from_product(&(pi_matrix(&conjugate(q)) * a)))
}

/// Jacobian of `R(q) a` wrt `q`, from the product `p = Pi(q) a = q ⊗ [0; a]`.
///
/// With `p = [p0; pv]` this is `2 [pv | −p0 I − [pv]×]`.
pub fn rotation_jacobian_from_product(p: &Vector4<f64>) -> Matrix3x4<f64> {
    let p0 = p[0];
    let pv = Vector3::new(p[1], p[2], p[3]);

    let mut jac = Matrix3x4::zeros();
    jac.column_mut(0).copy_from(&(pv * 2.0));
    jac.fixed_columns_mut::<3>(1)
        .copy_from(&((Matrix3::identity() * -p0 - pv.cross_matrix()) * 2.0));
    jac
}

/// Maps a Jacobian wrt `q*` to one wrt `q`.
pub(crate) fn conjugate_columns(mut jac: Matrix3x4<f64>) -> Matrix3x4<f64> {
    jac.fixed_columns_mut::<3>(1).neg_mut();
    jac
}
