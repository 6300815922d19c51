// sextant_core/src/landmarks/plucker.rs

//! Plücker lines `L = [n; v]`, with `v` the direction and `n = p × v` the moment
//! for any point `p` on the line.

use nalgebra::{Matrix3, Matrix3x6, Matrix6, Vector3, Vector6};

fn split(line: &Vector6<f64>) -> (Vector3<f64>, Vector3<f64>) {
    (
        line.fixed_rows::<3>(0).into_owned(),
        line.fixed_rows::<3>(3).into_owned(),
    )
}

/// The line through `a` and `b`, directed from `a` to `b`.
pub fn plucker_from_points(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector6<f64> {
    let v = b - a;
    let n = a.cross(&v);
    let mut line = Vector6::zeros();
    line.fixed_rows_mut::<3>(0).copy_from(&n);
    line.fixed_rows_mut::<3>(3).copy_from(&v);
    line
}

/// The point of the line closest to the origin, `v × n / |v|²`, with its Jacobian (3×6).
pub fn plucker_origin(line: &Vector6<f64>) -> (Vector3<f64>, Matrix3x6<f64>) {
    let (n, v) = split(line);
    let vv = v.norm_squared();
    let vxn = v.cross(&n);
    let origin = vxn / vv;

    let mut o_l = Matrix3x6::zeros();
    o_l.fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(v.cross_matrix() / vv));
    o_l.fixed_view_mut::<3, 3>(0, 3)
        .copy_from(&(-n.cross_matrix() / vv - vxn * v.transpose() * (2.0 / (vv * vv))));

    (origin, o_l)
}

/// Signed position of the projection of `p` on the line, measured from the Plücker
/// origin along the unit direction.
pub fn abscissa(line: &Vector6<f64>, p: &Vector3<f64>) -> f64 {
    let (origin, _) = plucker_origin(line);
    let (_, v) = split(line);
    (p - origin).dot(&v.normalize())
}

/// Finite 3D segment `[P1; P2]` carved from the line at the two abscissas, with its
/// Jacobian (6×6) wrt the line. The abscissas are treated as constants.
pub fn plucker_segment(line: &Vector6<f64>, abscissas: [f64; 2]) -> (Vector6<f64>, Matrix6<f64>) {
    let (_, v) = split(line);
    let (origin, o_l) = plucker_origin(line);

    let norm_v = v.norm();
    let u = v / norm_v;
    let u_v = (Matrix3::identity() - u * u.transpose()) / norm_v;

    let mut segment = Vector6::zeros();
    let mut s_l = Matrix6::zeros();
    for (i, t) in abscissas.into_iter().enumerate() {
        let row = 3 * i;
        segment.fixed_rows_mut::<3>(row).copy_from(&(origin + u * t));
        s_l.fixed_view_mut::<3, 6>(row, 0).copy_from(&o_l);
        let mut direction_block = s_l.fixed_view_mut::<3, 3>(row, 3);
        direction_block += u_v * t;
    }

    (segment, s_l)
}
