// sextant_core/src/mapping/mod.rs

use nalgebra::{DMatrix, DVector};
use std::ops::Range;

use crate::errors::ProjectionError;

mod selection;

pub use selection::StateSelection;

/// The filter's joint Gaussian belief: mean `x` and covariance `P` over every robot,
/// sensor and landmark state, each owning a disjoint index range.
///
/// Allocating and freeing those ranges is the map manager's job. This crate only
/// reads the map, through [`MapView`].
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticMap {
    /// The mean vector `x`.
    pub vector: DVector<f64>,
    /// The covariance matrix `P`.
    pub covariance: DMatrix<f64>,
}

impl StochasticMap {
    pub fn new(vector: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self, ProjectionError> {
        let dim = vector.len();
        for found in [covariance.nrows(), covariance.ncols()] {
            if found != dim {
                return Err(ProjectionError::DimensionMismatch {
                    what: "map covariance",
                    expected: dim,
                    found,
                });
            }
        }
        Ok(Self { vector, covariance })
    }

    /// A map of `dim` zeros with covariance `variance * I`.
    pub fn zeros(dim: usize, variance: f64) -> Self {
        Self {
            vector: DVector::zeros(dim),
            covariance: DMatrix::identity(dim, dim) * variance,
        }
    }

    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    /// A read-only snapshot for a projection pass.
    pub fn view(&self) -> MapView<'_> {
        MapView {
            x: &self.vector,
            p: &self.covariance,
        }
    }
}

/// Read-only handle on a map's mean and covariance.
///
/// It holds shared borrows, so while any view is alive the map cannot be corrected.
/// Views are `Copy` and can be handed to as many concurrent projections as needed.
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    x: &'a DVector<f64>,
    p: &'a DMatrix<f64>,
}

impl<'a> MapView<'a> {
    pub fn dim(&self) -> usize {
        self.x.len()
    }

    pub fn vector(&self) -> &'a DVector<f64> {
        self.x
    }

    pub fn covariance(&self) -> &'a DMatrix<f64> {
        self.p
    }

    /// Fails unless `range` is a valid, non-empty range of this map.
    /// `owner` names the entity in the error and is only evaluated on failure.
    pub fn check_range<F>(&self, range: &Range<usize>, owner: F) -> Result<(), ProjectionError>
    where
        F: FnOnce() -> String,
    {
        if range.is_empty() || range.end > self.dim() {
            return Err(ProjectionError::RangeOutOfBounds {
                owner: owner(),
                range: range.clone(),
                dim: self.dim(),
            });
        }
        Ok(())
    }

    /// A copy of the mean at `range`.
    pub fn mean<F>(&self, range: &Range<usize>, owner: F) -> Result<DVector<f64>, ProjectionError>
    where
        F: FnOnce() -> String,
    {
        self.check_range(range, owner)?;
        Ok(self.x.rows(range.start, range.len()).into_owned())
    }

    /// `P[indices, indices]`: rows and columns selected together, so the
    /// cross-covariances between the selected states are kept.
    ///
    /// Indices must be in bounds; [`MapView::check_range`] is how callers ensure it.
    pub fn covariance_block(&self, indices: &[usize]) -> DMatrix<f64> {
        DMatrix::from_fn(indices.len(), indices.len(), |i, j| {
            self.p[(indices[i], indices[j])]
        })
    }
}
