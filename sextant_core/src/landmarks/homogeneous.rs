// sextant_core/src/landmarks/homogeneous.rs

use nalgebra::{Matrix3x4, Vector3, Vector4};

/// Euclidean point `m / rho` and its Jacobian wrt `[m; rho]`. Undefined for `rho = 0`.
pub fn hmg_to_euclidean(h: &Vector4<f64>) -> (Vector3<f64>, Matrix3x4<f64>) {
    let m = h.fixed_rows::<3>(0).into_owned();
    let inv_rho = 1.0 / h[3];
    let p = m * inv_rho;

    let mut p_h = Matrix3x4::zeros();
    p_h[(0, 0)] = inv_rho;
    p_h[(1, 1)] = inv_rho;
    p_h[(2, 2)] = inv_rho;
    p_h.fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&(-p * inv_rho));

    (p, p_h)
}

pub fn euclidean_to_hmg(p: &Vector3<f64>) -> Vector4<f64> {
    Vector4::new(p.x, p.y, p.z, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dmatrix, dvector, numerical_jacobian};
    use approx::assert_abs_diff_eq;

    #[test]
    fn scaling_does_not_change_the_point() {
        let p = Vector3::new(2.0, -1.0, 0.5);
        let h = euclidean_to_hmg(&p) * 3.5;
        assert_abs_diff_eq!(hmg_to_euclidean(&h).0, p, epsilon = 1e-14);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let h = Vector4::new(0.4, 1.2, -0.7, 0.8);
        let numeric = numerical_jacobian(
            |x| dvector(&hmg_to_euclidean(&Vector4::from_column_slice(x.as_slice())).0),
            &dvector(&h),
        );
        assert_abs_diff_eq!(dmatrix(&hmg_to_euclidean(&h).1), numeric, epsilon = 1e-6);
    }
}
