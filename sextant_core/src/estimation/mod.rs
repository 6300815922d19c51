// sextant_core/src/estimation/mod.rs

//! Observation prediction: everything the correction step needs for one
//! (sensor, landmark) pair.

pub mod observation;
pub mod projection;

pub use observation::{
    Endpoint, Expectation, LinePrediction, Measurement, Observation, ObservationJacobians,
    ObservationPayload,
};
pub use projection::{ProjectionEngine, SEGMENT_MEASUREMENT_DIM};
