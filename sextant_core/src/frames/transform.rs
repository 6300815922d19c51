// sextant_core/src/frames/transform.rs

use nalgebra::{Matrix3, Matrix4, Matrix6, Vector3, Vector4, Vector6};

use crate::frames::{Frame, FrameJacobian};

/// Expresses a reference-frame point in the local coordinates of `frame`:
/// `p_F = Rᵀ (p_W − t)`.
pub fn to_frame(frame: &Frame, p_w: &Vector3<f64>) -> Vector3<f64> {
    frame.rt() * (p_w - frame.t())
}

/// [`to_frame`] together with its Jacobians.
///
/// # Returns
/// `(p_F, PF_f, PF_p)` where `PF_f` (3×7) is taken with respect to the frame state
/// `[t; q]` and `PF_p` (3×3) with respect to `p_W`. `PF_p` is simply `Rᵀ`.
pub fn to_frame_with_jacobians(
    frame: &Frame,
    p_w: &Vector3<f64>,
) -> (Vector3<f64>, FrameJacobian<3>, Matrix3<f64>) {
    let offset = p_w - frame.t();
    let p_f = frame.rt() * offset;

    let mut pf_f = FrameJacobian::<3>::zeros();
    pf_f.fixed_columns_mut::<3>(0).copy_from(&(-frame.rt()));
    pf_f.fixed_columns_mut::<4>(3)
        .copy_from(&frame.rotate_transpose_jacobian_q(&offset));

    (p_f, pf_f, *frame.rt())
}

/// The inverse of [`to_frame`]: `p_W = R p_F + t`.
pub fn from_frame(frame: &Frame, p_f: &Vector3<f64>) -> Vector3<f64> {
    frame.r() * p_f + frame.t()
}

/// [`from_frame`] together with its Jacobians wrt `[t; q]` (3×7) and `p_F` (3×3).
pub fn from_frame_with_jacobians(
    frame: &Frame,
    p_f: &Vector3<f64>,
) -> (Vector3<f64>, FrameJacobian<3>, Matrix3<f64>) {
    let p_w = from_frame(frame, p_f);

    let mut pw_f = FrameJacobian::<3>::zeros();
    pw_f.fixed_columns_mut::<3>(0).copy_from(&Matrix3::identity());
    pw_f.fixed_columns_mut::<4>(3)
        .copy_from(&frame.rotate_jacobian_q(p_f));

    (p_w, pw_f, *frame.r())
}

/// Expresses a homogeneous point `h = [m; rho]` in the local frame.
///
/// The point is never de-homogenized, so points at infinity (`rho = 0`) are fine:
/// `m_F = Rᵀ (m − t rho)`, `rho_F = rho`.
///
/// # Returns
/// `(h_F, HF_f, HF_h)` with `HF_f` 4×7 and `HF_h` 4×4.
pub fn hmg_to_frame_with_jacobians(
    frame: &Frame,
    h: &Vector4<f64>,
) -> (Vector4<f64>, FrameJacobian<4>, Matrix4<f64>) {
    let m = h.fixed_rows::<3>(0).into_owned();
    let rho = h[3];
    let offset = m - frame.t() * rho;
    let m_f = frame.rt() * offset;

    let mut hf_f = FrameJacobian::<4>::zeros();
    hf_f.fixed_view_mut::<3, 3>(0, 0).copy_from(&(-frame.rt() * rho));
    hf_f.fixed_view_mut::<3, 4>(0, 3)
        .copy_from(&frame.rotate_transpose_jacobian_q(&offset));

    let mut hf_h = Matrix4::zeros();
    hf_h.fixed_view_mut::<3, 3>(0, 0).copy_from(frame.rt());
    hf_h.fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&(-frame.rt() * frame.t()));
    hf_h[(3, 3)] = 1.0;

    (Vector4::new(m_f.x, m_f.y, m_f.z, rho), hf_f, hf_h)
}

/// Expresses a Plücker line `L = [n; v]` in the local frame:
/// `n_F = Rᵀ (n − t × v)`, `v_F = Rᵀ v`.
///
/// # Returns
/// `(L_F, LF_f, LF_l)` with `LF_f` 6×7 and `LF_l` 6×6.
pub fn plucker_to_frame_with_jacobians(
    frame: &Frame,
    line: &Vector6<f64>,
) -> (Vector6<f64>, FrameJacobian<6>, Matrix6<f64>) {
    let n = line.fixed_rows::<3>(0).into_owned();
    let v = line.fixed_rows::<3>(3).into_owned();
    let t = frame.t();
    let rt = frame.rt();

    let moment = n - t.cross(&v);
    let n_f = rt * moment;
    let v_f = rt * v;

    let mut lf_f = FrameJacobian::<6>::zeros();
    // d(-t × v)/dt = [v]×
    lf_f.fixed_view_mut::<3, 3>(0, 0).copy_from(&(rt * v.cross_matrix()));
    lf_f.fixed_view_mut::<3, 4>(0, 3)
        .copy_from(&frame.rotate_transpose_jacobian_q(&moment));
    lf_f.fixed_view_mut::<3, 4>(3, 3)
        .copy_from(&frame.rotate_transpose_jacobian_q(&v));

    let mut lf_l = Matrix6::zeros();
    lf_l.fixed_view_mut::<3, 3>(0, 0).copy_from(rt);
    lf_l.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-rt * t.cross_matrix()));
    lf_l.fixed_view_mut::<3, 3>(3, 3).copy_from(rt);

    let mut l_f = Vector6::zeros();
    l_f.fixed_rows_mut::<3>(0).copy_from(&n_f);
    l_f.fixed_rows_mut::<3>(3).copy_from(&v_f);

    (l_f, lf_f, lf_l)
}
