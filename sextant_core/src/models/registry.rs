// sextant_core/src/models/registry.rs

use std::collections::HashMap;

use crate::errors::ProjectionError;
use crate::models::{pinhole, ProjectionModel};
use crate::types::{LandmarkKind, SensorKind};

/// The lookup table from a (sensor kind, landmark kind) pair to the model that
/// projects it. Dispatch never depends on anything else.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<(SensorKind, LandmarkKind), Box<dyn ProjectionModel>>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every model shipped with this crate.
    pub fn with_default_models() -> Self {
        let mut registry = Self::new();
        for model in pinhole::default_models() {
            registry.register(model);
        }
        registry
    }

    /// Adds a model under its own kind pair, returning the one it replaces.
    pub fn register(&mut self, model: Box<dyn ProjectionModel>) -> Option<Box<dyn ProjectionModel>> {
        let key = (model.sensor_kind(), model.landmark_kind());
        let previous = self.models.insert(key, model);
        if previous.is_some() {
            tracing::debug!(sensor = %key.0, landmark = %key.1, "replaced projection model");
        }
        previous
    }

    /// The model for a kind pair.
    ///
    /// Fails with [`ProjectionError::UnknownSensorType`] when no model at all is
    /// registered for `sensor`, and with [`ProjectionError::UnknownLandmarkType`]
    /// when the sensor kind is known but does not observe `landmark`.
    pub fn get(
        &self,
        sensor: SensorKind,
        landmark: LandmarkKind,
    ) -> Result<&dyn ProjectionModel, ProjectionError> {
        if let Some(model) = self.models.get(&(sensor, landmark)) {
            return Ok(model.as_ref());
        }
        let names = (sensor.to_string(), landmark.to_string());
        if self.models.keys().any(|(s, _)| *s == sensor) {
            Err(ProjectionError::UnknownLandmarkType {
                sensor: names.0,
                landmark: names.1,
            })
        } else {
            Err(ProjectionError::UnknownSensorType {
                sensor: names.0,
                landmark: names.1,
            })
        }
    }

    pub fn supports(&self, sensor: SensorKind, landmark: LandmarkKind) -> bool {
        self.models.contains_key(&(sensor, landmark))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
