// sextant_core/src/models/pinhole/camera.rs

//! The pinhole camera itself: projection of points given in the camera frame
//! (z forward), with radial distortion, and of Plücker moments into image lines.

use nalgebra::{DMatrix, Matrix2, Matrix2x3, Matrix2x4, Matrix3, Matrix3x4, Vector2, Vector3};

use crate::platform::Intrinsics;

/// A pixel prediction and its Jacobians.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelProjection {
    pub pixel: Vector2<f64>,
    /// Wrt the point in the camera frame.
    pub u_p: Matrix2x3<f64>,
    /// Wrt `[u0, v0, au, av]`.
    pub u_k: Matrix2x4<f64>,
    /// Wrt the distortion coefficients, one column each.
    pub u_d: DMatrix<f64>,
}

/// Projects a camera-frame point to pixels. Undefined for `z = 0`.
pub fn project_point(p: &Vector3<f64>, k: &Intrinsics, distortion: &[f64]) -> PixelProjection {
    let inv_z = 1.0 / p.z;
    let un = Vector2::new(p.x * inv_z, p.y * inv_z);
    let un_p = Matrix2x3::new(
        inv_z, 0.0, -un.x * inv_z, //
        0.0, inv_z, -un.y * inv_z,
    );

    // Radial distortion: ud = un (1 + d1 r² + d2 r⁴ + ...)
    let r2 = un.norm_squared();
    let mut factor = 1.0;
    let mut factor_r2 = 0.0;
    let mut r2_pow = 1.0; // r2^(i-1)
    let mut ud_d = DMatrix::zeros(2, distortion.len());
    for (i, d) in distortion.iter().enumerate() {
        let power = (i + 1) as f64;
        factor_r2 += power * d * r2_pow;
        r2_pow *= r2;
        factor += d * r2_pow;
        ud_d.column_mut(i).copy_from(&(un * r2_pow));
    }
    let ud = un * factor;
    let ud_un = Matrix2::identity() * factor + un * un.transpose() * (2.0 * factor_r2);

    let focal = Matrix2::new(k.au, 0.0, 0.0, k.av);
    let pixel = Vector2::new(k.u0 + k.au * ud.x, k.v0 + k.av * ud.y);
    let u_k = Matrix2x4::new(
        1.0, 0.0, ud.x, 0.0, //
        0.0, 1.0, 0.0, ud.y,
    );

    PixelProjection {
        pixel,
        u_p: focal * ud_un * un_p,
        u_k,
        u_d: DMatrix::from_column_slice(2, 2, focal.as_slice()) * ud_d,
    }
}

/// Intrinsic matrix for lines, `det(K) K⁻ᵀ`, mapping a camera-frame Plücker moment
/// to homogeneous image line coefficients.
pub fn line_intrinsic_matrix(k: &Intrinsics) -> Matrix3<f64> {
    Matrix3::new(
        k.av, 0.0, 0.0, //
        0.0, k.au, 0.0, //
        -k.av * k.u0, -k.au * k.v0, k.au * k.av,
    )
}

/// Image line `l = K_L n` and its Jacobians wrt `n` (3×3) and `[u0, v0, au, av]` (3×4).
pub fn project_moment(n: &Vector3<f64>, k: &Intrinsics) -> (Vector3<f64>, Matrix3<f64>, Matrix3x4<f64>) {
    let kl = line_intrinsic_matrix(k);
    let l_k = Matrix3x4::new(
        0.0, 0.0, 0.0, n.x, //
        0.0, 0.0, n.y, 0.0, //
        -k.av * n.x, -k.au * n.y, -k.v0 * n.y + k.av * n.z, -k.u0 * n.x + k.au * n.z,
    );
    (kl * n, kl, l_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dmatrix, dvector, numerical_jacobian};
    use approx::assert_abs_diff_eq;
    use nalgebra::{DVector, Vector4};

    fn intrinsics() -> Intrinsics {
        Intrinsics::new(320.0, 240.0, 500.0, 480.0)
    }

    #[test]
    fn optical_axis_hits_the_principal_point() {
        let proj = project_point(&Vector3::new(0.0, 0.0, 3.0), &intrinsics(), &[-0.2, 0.05]);
        assert_abs_diff_eq!(proj.pixel, intrinsics().principal_point(), epsilon = 1e-12);
    }

    #[test]
    fn point_jacobians_match_finite_differences() {
        let p = Vector3::new(0.4, -0.3, 2.5);
        let d = [-0.25, 0.07, 0.001];
        let proj = project_point(&p, &intrinsics(), &d);

        let by_point = numerical_jacobian(
            |x| dvector(&project_point(&Vector3::from_column_slice(x.as_slice()), &intrinsics(), &d).pixel),
            &dvector(&p),
        );
        let by_k = numerical_jacobian(
            |x| {
                let k = Intrinsics::from_vector(&Vector4::from_column_slice(x.as_slice()));
                dvector(&project_point(&p, &k, &d).pixel)
            },
            &dvector(&intrinsics().as_vector()),
        );
        let by_d = numerical_jacobian(
            |x| dvector(&project_point(&p, &intrinsics(), x.as_slice()).pixel),
            &DVector::from_column_slice(&d),
        );

        assert_abs_diff_eq!(dmatrix(&proj.u_p), by_point, epsilon = 1e-4);
        assert_abs_diff_eq!(dmatrix(&proj.u_k), by_k, epsilon = 1e-6);
        assert_abs_diff_eq!(proj.u_d, by_d, epsilon = 1e-4);
    }

    #[test]
    fn projected_points_lie_on_the_projected_line() {
        let k = intrinsics();
        let a = Vector3::new(0.5, -0.2, 3.0);
        let b = Vector3::new(-0.4, 0.6, 5.0);
        let (l, _, _) = project_moment(&a.cross(&(b - a)), &k);

        for p in [a, b, (a + b) * 0.5] {
            let px = project_point(&p, &k, &[]).pixel;
            assert_abs_diff_eq!(l.dot(&Vector3::new(px.x, px.y, 1.0)), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn moment_jacobians_match_finite_differences() {
        let n = Vector3::new(0.3, -1.1, 0.7);
        let (_, l_n, l_k) = project_moment(&n, &intrinsics());
        let by_k = numerical_jacobian(
            |x| {
                let k = Intrinsics::from_vector(&Vector4::from_column_slice(x.as_slice()));
                dvector(&project_moment(&n, &k).0)
            },
            &dvector(&intrinsics().as_vector()),
        );
        assert_abs_diff_eq!(dmatrix(&l_k), by_k, epsilon = 1e-4);
        assert_eq!(l_n, line_intrinsic_matrix(&intrinsics()));
    }
}
