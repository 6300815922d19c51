// sextant_core/src/landmarks.rs

use std::ops::Range;

use crate::types::{LandmarkId, LandmarkKind};

pub mod homogeneous;
pub mod inverse_depth;
pub mod plucker;

/// Kind-specific auxiliary data carried next to a landmark's map state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LandmarkParams {
    #[default]
    None,
    /// The two stored endpoints of a line landmark, as signed distances along the
    /// line's unit direction measured from its Plücker origin.
    Line { abscissas: [f64; 2] },
}

/// A map feature. Its mean and covariance live in the map at `range`, which no
/// other entity shares.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub id: LandmarkId,
    pub kind: LandmarkKind,
    pub range: Range<usize>,
    pub params: LandmarkParams,
}

impl Landmark {
    /// A point landmark whose state starts at map index `start`.
    pub fn point(id: LandmarkId, kind: LandmarkKind, start: usize) -> Self {
        Self {
            id,
            kind,
            range: start..start + kind.state_dim(),
            params: LandmarkParams::None,
        }
    }

    /// A Plücker line landmark whose state starts at map index `start`.
    pub fn line(id: LandmarkId, start: usize, abscissas: [f64; 2]) -> Self {
        let kind = LandmarkKind::PluckerLine;
        Self {
            id,
            kind,
            range: start..start + kind.state_dim(),
            params: LandmarkParams::Line { abscissas },
        }
    }

    pub fn abscissas(&self) -> Option<[f64; 2]> {
        match self.params {
            LandmarkParams::Line { abscissas } => Some(abscissas),
            LandmarkParams::None => None,
        }
    }
}
