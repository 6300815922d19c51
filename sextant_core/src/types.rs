// sextant_core/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ProjectionError;

// --- Core Identifiers ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RobotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SensorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct LandmarkId(pub u32);

/// The kind of a sensor, which selects the family of projection models used for it.
///
/// Each kind has a canonical short name (e.g. `"pinHole"`). That name is what
/// configuration files use and what dispatch errors report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SensorKind {
    /// A perspective camera producing 2D pixel measurements.
    Pinhole,
    /// A perspective camera that additionally measures depth along its optical axis.
    PinholeDepth,
    /// A central omnidirectional camera.
    Omnidirectional,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Pinhole,
        SensorKind::PinholeDepth,
        SensorKind::Omnidirectional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Pinhole => "pinHole",
            SensorKind::PinholeDepth => "pinHoleDepth",
            SensorKind::Omnidirectional => "omniCam",
        }
    }
}

/// The geometric parameterization of a landmark's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LandmarkKind {
    /// `[x0; yaw; pitch; rho]`: anchor, bearing angles and inverse distance.
    InverseDepthPoint,
    /// `[x; y; z]`.
    EuclideanPoint,
    /// `[m; rho]`, representing the point `m / rho`.
    HomogeneousPoint,
    /// `[n; v]`: moment and direction of a 3D line.
    PluckerLine,
}

impl LandmarkKind {
    pub const ALL: [LandmarkKind; 4] = [
        LandmarkKind::InverseDepthPoint,
        LandmarkKind::EuclideanPoint,
        LandmarkKind::HomogeneousPoint,
        LandmarkKind::PluckerLine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkKind::InverseDepthPoint => "idpPnt",
            LandmarkKind::EuclideanPoint => "eucPnt",
            LandmarkKind::HomogeneousPoint => "hmgPnt",
            LandmarkKind::PluckerLine => "plkLin",
        }
    }

    /// Number of map entries occupied by a landmark of this kind.
    pub fn state_dim(&self) -> usize {
        match self {
            LandmarkKind::InverseDepthPoint => 6,
            LandmarkKind::EuclideanPoint => 3,
            LandmarkKind::HomogeneousPoint => 4,
            LandmarkKind::PluckerLine => 6,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, LandmarkKind::PluckerLine)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProjectionError::UnknownTypeName {
                category: "sensor",
                name: s.to_string(),
            })
    }
}

impl FromStr for LandmarkKind {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandmarkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProjectionError::UnknownTypeName {
                category: "landmark",
                name: s.to_string(),
            })
    }
}

// serde goes through the canonical names so config files read like the error messages.
impl TryFrom<String> for SensorKind {
    type Error = ProjectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SensorKind> for String {
    fn from(kind: SensorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for LandmarkKind {
    type Error = ProjectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LandmarkKind> for String {
    fn from(kind: LandmarkKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_their_names() {
        for kind in SensorKind::ALL {
            assert_eq!(kind.as_str().parse::<SensorKind>().unwrap(), kind);
        }
        for kind in LandmarkKind::ALL {
            assert_eq!(kind.to_string().parse::<LandmarkKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = "ahmPnt".parse::<LandmarkKind>().unwrap_err();
        assert!(err.to_string().contains("ahmPnt"));
        assert!(err.to_string().contains("landmark"));
    }
}
