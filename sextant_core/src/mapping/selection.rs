// sextant_core/src/mapping/selection.rs

use nalgebra::DMatrix;
use std::ops::Range;

use crate::errors::ProjectionError;
use crate::mapping::MapView;

/// An ordered set of map blocks, each paired with the Jacobian of some quantity
/// with respect to that block.
///
/// Index ranges and Jacobian blocks are only ever added together, so the index
/// order used to slice `P` always matches the column order of the stacked Jacobian.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSelection {
    blocks: Vec<(Range<usize>, DMatrix<f64>)>,
}

impl StateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block. `jacobian` must have one column per index in `range`, and as
    /// many rows as the blocks already present.
    pub fn push(&mut self, range: Range<usize>, jacobian: DMatrix<f64>) -> Result<(), ProjectionError> {
        if jacobian.ncols() != range.len() {
            return Err(ProjectionError::DimensionMismatch {
                what: "selection jacobian columns",
                expected: range.len(),
                found: jacobian.ncols(),
            });
        }
        if let Some(rows) = self.rows() {
            if jacobian.nrows() != rows {
                return Err(ProjectionError::DimensionMismatch {
                    what: "selection jacobian rows",
                    expected: rows,
                    found: jacobian.nrows(),
                });
            }
        }
        self.blocks.push((range, jacobian));
        Ok(())
    }

    pub fn with(mut self, range: Range<usize>, jacobian: DMatrix<f64>) -> Result<Self, ProjectionError> {
        self.push(range, jacobian)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Row count of the Jacobian, if any block has been added.
    pub fn rows(&self) -> Option<usize> {
        self.blocks.first().map(|(_, jac)| jac.nrows())
    }

    pub fn ranges(&self) -> impl Iterator<Item = &Range<usize>> {
        self.blocks.iter().map(|(range, _)| range)
    }

    /// Concatenated map indices, in block order.
    pub fn indices(&self) -> Vec<usize> {
        self.blocks.iter().flat_map(|(range, _)| range.clone()).collect()
    }

    /// Horizontally stacked Jacobian, in block order.
    pub fn jacobian(&self) -> DMatrix<f64> {
        let rows = self.rows().unwrap_or(0);
        let cols = self.blocks.iter().map(|(range, _)| range.len()).sum();
        let mut stacked = DMatrix::zeros(rows, cols);
        let mut col = 0;
        for (range, jac) in &self.blocks {
            stacked.columns_mut(col, range.len()).copy_from(jac);
            col += range.len();
        }
        stacked
    }

    /// Propagates the map covariance through the selection: `J P[idx, idx] Jᵀ`.
    ///
    /// The result is symmetrized to remove round-off asymmetry.
    pub fn propagate(&self, map: &MapView) -> Result<DMatrix<f64>, ProjectionError> {
        for range in self.ranges() {
            map.check_range(range, || "state selection".to_string())?;
        }
        let indices = self.indices();
        let jac = self.jacobian();
        let p = map.covariance_block(&indices);

        let cov = &jac * p * jac.transpose();
        tracing::trace!(
            states = indices.len(),
            rows = cov.nrows(),
            "propagated covariance through state selection"
        );
        Ok((&cov + cov.transpose()) * 0.5)
    }
}
