// sextant_core/src/frames/segment.rs

use nalgebra::{Matrix6, Matrix6xX, Vector3, Vector6};

use crate::frames::transform::{to_frame, to_frame_with_jacobians};
use crate::frames::{Frame, FrameJacobian};

/// Jacobian availability for a segment transform.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentJacobians {
    /// Jacobians of the single transformed segment.
    Computed {
        /// 6×7, both endpoints stacked, wrt the frame state `[t; q]`.
        sf_f: FrameJacobian<6>,
        /// 6×6 block diagonal, wrt the input segment.
        sf_s: Matrix6<f64>,
    },
    NotRequested,
    /// Jacobians were requested for more than one segment. Batches are value-only.
    UnavailableForBatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedSegments {
    pub segments: Matrix6xX<f64>,
    pub jacobians: SegmentJacobians,
}

/// Expresses one segment `[P1; P2]` in the local frame, with Jacobians.
///
/// The endpoints are transformed independently, so `SF_s` is block diagonal and its
/// off-diagonal 3×3 blocks are exactly zero.
pub fn segment_to_frame(
    frame: &Frame,
    segment: &Vector6<f64>,
) -> (Vector6<f64>, FrameJacobian<6>, Matrix6<f64>) {
    let p1 = segment.fixed_rows::<3>(0).into_owned();
    let p2 = segment.fixed_rows::<3>(3).into_owned();
    let (q1, q1_f, q1_p) = to_frame_with_jacobians(frame, &p1);
    let (q2, q2_f, q2_p) = to_frame_with_jacobians(frame, &p2);

    let mut s_f = Vector6::zeros();
    s_f.fixed_rows_mut::<3>(0).copy_from(&q1);
    s_f.fixed_rows_mut::<3>(3).copy_from(&q2);

    let mut sf_f = FrameJacobian::<6>::zeros();
    sf_f.fixed_rows_mut::<3>(0).copy_from(&q1_f);
    sf_f.fixed_rows_mut::<3>(3).copy_from(&q2_f);

    let mut sf_s = Matrix6::zeros();
    sf_s.fixed_view_mut::<3, 3>(0, 0).copy_from(&q1_p);
    sf_s.fixed_view_mut::<3, 3>(3, 3).copy_from(&q2_p);

    (s_f, sf_f, sf_s)
}

/// Expresses a batch of segments (one per column) in the local frame.
///
/// With a single column and `with_jacobians` set this behaves like
/// [`segment_to_frame`]. For larger batches Jacobians are never computed: batched
/// segments only feed rendering, not the filter, so a request for them is logged
/// and answered with [`SegmentJacobians::UnavailableForBatch`]. An empty batch has
/// nothing to differentiate and reports [`SegmentJacobians::NotRequested`].
pub fn segments_to_frame(
    frame: &Frame,
    segments: &Matrix6xX<f64>,
    with_jacobians: bool,
) -> TransformedSegments {
    let count = segments.ncols();

    if with_jacobians && count == 1 {
        let segment = segments.column(0).into_owned();
        let (s_f, sf_f, sf_s) = segment_to_frame(frame, &segment);
        return TransformedSegments {
            segments: Matrix6xX::from_column_slice(s_f.as_slice()),
            jacobians: SegmentJacobians::Computed { sf_f, sf_s },
        };
    }

    let mut out = Matrix6xX::zeros(count);
    for (i, column) in segments.column_iter().enumerate() {
        for offset in [0, 3] {
            let p = Vector3::new(column[offset], column[offset + 1], column[offset + 2]);
            out.fixed_view_mut::<3, 1>(offset, i)
                .copy_from(&to_frame(frame, &p));
        }
    }

    let jacobians = if with_jacobians && count > 1 {
        tracing::warn!(
            segments = count,
            "Jacobians are not available for batched segments, returning values only."
        );
        SegmentJacobians::UnavailableForBatch
    } else {
        SegmentJacobians::NotRequested
    };

    TransformedSegments {
        segments: out,
        jacobians,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dmatrix, dvector, frame_from, numerical_jacobian, random_frame, seeded_rng};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Matrix3, Vector6};

    fn sample_segment() -> Vector6<f64> {
        Vector6::new(1.0, 2.0, 3.0, -1.0, 0.5, 4.0)
    }

    #[test]
    fn single_segment_jacobian_is_block_diagonal() {
        let mut rng = seeded_rng();
        let frame = random_frame(&mut rng, 2.0);
        let (_, _, sf_s) = segment_to_frame(&frame, &sample_segment());

        assert_eq!(sf_s.fixed_view::<3, 3>(0, 3).into_owned(), Matrix3::zeros());
        assert_eq!(sf_s.fixed_view::<3, 3>(3, 0).into_owned(), Matrix3::zeros());
        assert_eq!(sf_s.fixed_view::<3, 3>(0, 0).into_owned(), *frame.rt());
        assert_eq!(sf_s.fixed_view::<3, 3>(3, 3).into_owned(), *frame.rt());
    }

    #[test]
    fn single_segment_jacobians_match_finite_differences() {
        let mut rng = seeded_rng();
        let frame = random_frame(&mut rng, 2.0);
        let segment = sample_segment();
        let (_, sf_f, sf_s) = segment_to_frame(&frame, &segment);

        let by_frame = numerical_jacobian(
            |x| dvector(&segment_to_frame(&frame_from(x), &segment).0),
            &dvector(&frame.state()),
        );
        let by_segment = numerical_jacobian(
            |x| dvector(&segment_to_frame(&frame, &Vector6::from_column_slice(x.as_slice())).0),
            &dvector(&segment),
        );
        assert_abs_diff_eq!(dmatrix(&sf_f), by_frame, epsilon = 1e-5);
        assert_abs_diff_eq!(dmatrix(&sf_s), by_segment, epsilon = 1e-5);
    }

    #[test]
    fn batch_of_one_returns_full_jacobians() {
        let frame = random_frame(&mut seeded_rng(), 2.0);
        let batch = Matrix6xX::from_column_slice(sample_segment().as_slice());

        let out = segments_to_frame(&frame, &batch, true);
        assert!(matches!(out.jacobians, SegmentJacobians::Computed { .. }));
    }

    #[test]
    fn batch_of_two_degrades_to_values_only() {
        let frame = random_frame(&mut seeded_rng(), 2.0);
        let a = sample_segment();
        let b = Vector6::new(0.0, 0.0, 1.0, 2.0, -2.0, 5.0);
        let batch = Matrix6xX::from_columns(&[a, b]);

        let out = segments_to_frame(&frame, &batch, true);
        assert_eq!(out.jacobians, SegmentJacobians::UnavailableForBatch);
        assert_eq!(out.segments.ncols(), 2);

        // Values must still match the single-segment path column by column.
        for (column, segment) in [a, b].iter().enumerate() {
            let (expected, _, _) = segment_to_frame(&frame, segment);
            assert_abs_diff_eq!(out.segments.column(column).into_owned(), expected, epsilon = 1e-12);
        }

        let quiet = segments_to_frame(&frame, &batch, false);
        assert_eq!(quiet.jacobians, SegmentJacobians::NotRequested);
        assert_eq!(quiet.segments, out.segments);
    }

    #[test]
    fn empty_batch_has_no_jacobians_to_report() {
        let frame = random_frame(&mut seeded_rng(), 2.0);
        let out = segments_to_frame(&frame, &Matrix6xX::zeros(0), true);

        assert_eq!(out.segments.ncols(), 0);
        assert_eq!(out.jacobians, SegmentJacobians::NotRequested);
    }
}
