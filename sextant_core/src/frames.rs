// sextant_core/src/frames.rs

use nalgebra::{Isometry3, Matrix3, Matrix3x4, Matrix4x3, SMatrix, SVector, Vector3, Vector4};

use crate::errors::ProjectionError;

pub mod quaternion;
pub mod segment;
pub mod transform;

/// Size of a frame's flat state `[t; q]`.
pub const FRAME_STATE_DIM: usize = 7;

/// A Jacobian of an `R`-dimensional quantity with respect to a frame state `[t; q]`.
pub type FrameJacobian<const R: usize> = SMatrix<f64, R, FRAME_STATE_DIM>;

/// The flat `[t; q]` representation of a frame.
pub type FrameState = SVector<f64, FRAME_STATE_DIM>;

/// A rigid-body pose: translation `t` and orientation quaternion `q = [w, x, y, z]`.
///
/// The rotation matrix, its transpose and the two quaternion "Pi" matrices are
/// derived from `q` and cached, because the same frame is used for many
/// transforms per filter cycle. They are private so they can never drift from `q`:
/// every mutation goes through [`Frame::set_state`].
///
/// The orientation is expected to be a unit quaternion. Nothing here normalizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    t: Vector3<f64>,
    q: Vector4<f64>,
    r: Matrix3<f64>,
    rt: Matrix3<f64>,
    pi: Matrix4x3<f64>,
    pc: Matrix4x3<f64>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame {
    pub fn new(t: Vector3<f64>, q: Vector4<f64>) -> Self {
        let r = quaternion::rotation_matrix(&q);
        Self {
            t,
            q,
            r,
            rt: r.transpose(),
            pi: quaternion::pi_matrix(&q),
            pc: quaternion::pi_matrix(&quaternion::conjugate(&q)),
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector4::new(1.0, 0.0, 0.0, 0.0))
    }

    /// Builds a frame from a flat `[t; q]` slice, e.g. a range of the map mean.
    pub fn from_state(x: &[f64]) -> Result<Self, ProjectionError> {
        if x.len() != FRAME_STATE_DIM {
            return Err(ProjectionError::DimensionMismatch {
                what: "frame state",
                expected: FRAME_STATE_DIM,
                found: x.len(),
            });
        }
        Ok(Self::new(
            Vector3::new(x[0], x[1], x[2]),
            Vector4::new(x[3], x[4], x[5], x[6]),
        ))
    }

    /// Converts an nalgebra isometry. Note nalgebra stores quaternions as `[i, j, k, w]`.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let q = iso.rotation.quaternion();
        Self::new(
            iso.translation.vector,
            Vector4::new(q.w, q.i, q.j, q.k),
        )
    }

    /// Replaces the pose and refreshes every derived quantity.
    pub fn set_state(&mut self, t: Vector3<f64>, q: Vector4<f64>) {
        *self = Self::new(t, q);
    }

    pub fn state(&self) -> FrameState {
        FrameState::from_column_slice(&[
            self.t.x, self.t.y, self.t.z, self.q[0], self.q[1], self.q[2], self.q[3],
        ])
    }

    pub fn t(&self) -> &Vector3<f64> {
        &self.t
    }

    pub fn q(&self) -> &Vector4<f64> {
        &self.q
    }

    /// Rotation matrix taking local coordinates to the reference frame.
    pub fn r(&self) -> &Matrix3<f64> {
        &self.r
    }

    /// Transposed rotation, taking reference coordinates to the local frame.
    pub fn rt(&self) -> &Matrix3<f64> {
        &self.rt
    }

    /// `Pi(q)`, such that `q ⊗ [0; w] = Pi(q) w`.
    pub fn pi(&self) -> &Matrix4x3<f64> {
        &self.pi
    }

    /// `Pi(q*)`, the same matrix for the conjugate orientation.
    pub fn pc(&self) -> &Matrix4x3<f64> {
        &self.pc
    }

    /// Jacobian of `R a` wrt `q`, built from the cached `Pi(q)`.
    pub fn rotate_jacobian_q(&self, a: &Vector3<f64>) -> Matrix3x4<f64> {
        quaternion::rotation_jacobian_from_product(&(self.pi * a))
    }

    /// Jacobian of `Rᵀ a` wrt `q`, built from the cached `Pc`.
    pub fn rotate_transpose_jacobian_q(&self, a: &Vector3<f64>) -> Matrix3x4<f64> {
        quaternion::conjugate_columns(quaternion::rotation_jacobian_from_product(&(self.pc * a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn derived_quantities_follow_the_quaternion() {
        let rot = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        let iso = Isometry3::from_parts(Vector3::new(1.0, -2.0, 0.5).into(), rot);
        let mut frame = Frame::from_isometry(&iso);

        assert_abs_diff_eq!(*frame.r(), *rot.to_rotation_matrix().matrix(), epsilon = 1e-12);
        assert_abs_diff_eq!(*frame.rt(), frame.r().transpose(), epsilon = 1e-15);

        let other = UnitQuaternion::from_euler_angles(-1.0, 0.4, 0.0);
        let q = other.quaternion();
        frame.set_state(Vector3::zeros(), Vector4::new(q.w, q.i, q.j, q.k));
        assert_abs_diff_eq!(*frame.r(), *other.to_rotation_matrix().matrix(), epsilon = 1e-12);
        assert_abs_diff_eq!(*frame.rt(), frame.r().transpose(), epsilon = 1e-15);
        assert_abs_diff_eq!(
            *frame.pc(),
            quaternion::pi_matrix(&quaternion::conjugate(frame.q())),
            epsilon = 1e-15
        );
    }

    #[test]
    fn cached_jacobians_agree_with_the_quaternion_forms() {
        let rot = UnitQuaternion::from_euler_angles(-0.7, 0.25, 2.0);
        let frame = Frame::from_isometry(&Isometry3::from_parts(Vector3::new(0.3, 0.0, -1.0).into(), rot));
        let a = Vector3::new(2.0, -0.5, 1.25);

        assert_abs_diff_eq!(
            frame.rotate_jacobian_q(&a),
            quaternion::rotate_jacobian_q(frame.q(), &a),
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(
            frame.rotate_transpose_jacobian_q(&a),
            quaternion::rotate_transpose_jacobian_q(frame.q(), &a),
            epsilon = 1e-14
        );
        // Quadratic in q, so the Jacobian maps q back to twice the rotated vector.
        assert_abs_diff_eq!(
            frame.rotate_transpose_jacobian_q(&a) * frame.q(),
            frame.rt() * a * 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn state_round_trips_through_flat_vector() {
        let x = [0.1, 0.2, 0.3, 0.5, 0.5, 0.5, 0.5];
        let frame = Frame::from_state(&x).unwrap();
        assert_eq!(frame.state().as_slice(), &x);
    }

    #[test]
    fn from_state_rejects_wrong_length() {
        let err = Frame::from_state(&[0.0; 6]).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::DimensionMismatch { expected: 7, found: 6, .. }
        ));
    }
}
