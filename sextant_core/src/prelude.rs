// sextant_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::models::{ProjectionContext, ProjectionModel, ProjectionOutput};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::frames::{Frame, FrameJacobian, FrameState};
pub use crate::landmarks::{Landmark, LandmarkParams};
pub use crate::mapping::{MapView, StateSelection, StochasticMap};
pub use crate::platform::{ImageSize, Intrinsics, Robot, Sensor, SensorParams};
pub use crate::types::{LandmarkId, LandmarkKind, RobotId, SensorId, SensorKind};

// --- Projection ---
pub use crate::config::{EngineConfig, LineVisibilityPolicy};
pub use crate::errors::{ConfigError, ProjectionError};
pub use crate::estimation::{Observation, ObservationPayload, ProjectionEngine};
pub use crate::models::ModelRegistry;

// --- Concrete Model Implementations ---
pub use crate::models::pinhole::{PinholeLineModel, PinholePointModel};
