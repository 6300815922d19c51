// sextant_core/src/models/pinhole/mod.rs

//! Pinhole camera models, with and without a depth channel.

use crate::errors::ProjectionError;
use crate::models::ProjectionModel;
use crate::types::LandmarkKind;

pub mod camera;
pub mod lines;
pub mod points;

pub use lines::{PinholeLineModel, SegmentProjection};
pub use points::PinholePointModel;

/// Every pinhole model this crate ships: `pinHole` observes all landmark kinds,
/// `pinHoleDepth` the point kinds.
pub fn default_models() -> Vec<Box<dyn ProjectionModel>> {
    let mut models: Vec<Box<dyn ProjectionModel>> = Vec::new();
    for kind in LandmarkKind::ALL.into_iter().filter(|k| !k.is_line()) {
        models.push(Box::new(PinholePointModel::new(kind)));
        models.push(Box::new(PinholePointModel::with_depth(kind)));
    }
    models.push(Box::new(PinholeLineModel));
    models
}

pub(crate) fn check_landmark_dim(kind: LandmarkKind, found: usize) -> Result<(), ProjectionError> {
    if found != kind.state_dim() {
        return Err(ProjectionError::DimensionMismatch {
            what: "landmark state",
            expected: kind.state_dim(),
            found,
        });
    }
    Ok(())
}
