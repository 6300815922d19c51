// sextant_core/src/estimation/projection.rs

use nalgebra::{DMatrix, DVector, Vector6};
use std::ops::Range;

use crate::config::{EngineConfig, LineVisibilityPolicy};
use crate::errors::ProjectionError;
use crate::estimation::observation::{
    Endpoint, Expectation, LinePrediction, Observation, ObservationJacobians, ObservationPayload,
};
use crate::frames::FRAME_STATE_DIM;
use crate::landmarks::plucker::plucker_segment;
use crate::landmarks::Landmark;
use crate::mapping::{MapView, StateSelection};
use crate::models::visibility::visible_segment;
use crate::models::{dynamic, ModelRegistry, ProjectionContext, ProjectionModel, ProjectionOutput};
use crate::platform::{Robot, Sensor};

/// Size of a segment measurement `[u1; v1; u2; v2]`, which is what line
/// observations are measured against.
pub const SEGMENT_MEASUREMENT_DIM: usize = 4;

/// Predicts observations of landmarks from the current map.
///
/// The engine never writes to the map. It reads the mean and covariance through a
/// [`MapView`], and only the [`Observation`] passed in is modified, so any number
/// of (sensor, landmark) pairs can be projected concurrently against one snapshot.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    registry: ModelRegistry,
    config: EngineConfig,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(ModelRegistry::with_default_models(), EngineConfig::default())
    }
}

impl ProjectionEngine {
    pub fn new(registry: ModelRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Projects `landmark` into a fresh observation with measurement noise `r`.
    pub fn predict(
        &self,
        map: MapView,
        robot: &Robot,
        sensor: &Sensor,
        landmark: &Landmark,
        r: DMatrix<f64>,
    ) -> Result<Observation, ProjectionError> {
        let mut obs = Observation::new(sensor.id, landmark, r);
        self.project(map, robot, sensor, landmark, &mut obs)?;
        Ok(obs)
    }

    /// Projects `landmark` as seen by `sensor` on `robot`, overwriting `obs`.
    ///
    /// The robot and sensor frames are taken as cached on the entities; the
    /// landmark state and every covariance are read from `map`. Only the
    /// measurement part of `obs` is left untouched. On error, `obs` is unchanged.
    pub fn project(
        &self,
        map: MapView,
        robot: &Robot,
        sensor: &Sensor,
        landmark: &Landmark,
        obs: &mut Observation,
    ) -> Result<(), ProjectionError> {
        check_entities(&map, robot, sensor, landmark)?;
        let model = self.registry.get(sensor.kind, landmark.kind)?;
        check_noise(model, landmark, &obs.measurement.r)?;

        tracing::debug!(
            sensor = ?sensor.id,
            landmark = ?landmark.id,
            sensor_kind = %sensor.kind,
            landmark_kind = %landmark.kind,
            "projecting landmark"
        );

        let state = map.mean(&landmark.range, || describe(landmark))?;
        let ctx = ProjectionContext {
            robot_frame: &robot.frame,
            sensor_frame: &sensor.frame,
            params: &sensor.params,
        };
        let mut out = model.project(&ctx, &state)?;

        let line = if landmark.kind.is_line() {
            self.normalize_line(landmark, &mut out)?;
            let mut line = predict_segment(
                &map,
                model,
                &ctx,
                robot,
                sensor,
                landmark,
                &state,
                &obs.measurement.r,
            )?;
            line.line_visible = model.is_visible(&out.e, out.depth, &sensor.params.image_size);
            Some(line)
        } else {
            self.check_point_depth(landmark, &out)?;
            None
        };

        let covariance = state_selection(
            robot,
            sensor,
            landmark,
            out.e_rf.clone(),
            out.e_sf.clone(),
            out.e_l.clone(),
        )?
        .propagate(&map)?;
        let uncertainty = covariance.determinant();

        let visible = match &line {
            None => model.is_visible(&out.e, out.depth, &sensor.params.image_size),
            Some(line) => match self.config.line_visibility {
                LineVisibilityPolicy::AlwaysVisible => {
                    if !line.segment_visible {
                        tracing::debug!(
                            landmark = ?landmark.id,
                            "segment not visible, reporting the line as visible per policy"
                        );
                    }
                    true
                }
                LineVisibilityPolicy::Computed => line.segment_visible,
            },
        };

        obs.sensor = sensor.id;
        obs.landmark = landmark.id;
        obs.landmark_kind = landmark.kind;
        obs.visible = visible;
        obs.expectation = Expectation {
            e: out.e,
            depth: out.depth,
            covariance,
            uncertainty,
        };
        obs.jacobians = ObservationJacobians {
            e_r: out.e_rf,
            e_s: out.e_sf,
            e_l: out.e_l,
        };
        obs.payload = line.map_or(ObservationPayload::Point, ObservationPayload::Line);
        Ok(())
    }

    /// Scales a homogeneous image line and all its Jacobians so that its
    /// direction part `[a, b]` has unit norm.
    fn normalize_line(&self, landmark: &Landmark, out: &mut ProjectionOutput) -> Result<(), ProjectionError> {
        let norm = out.e.rows(0, 2).norm();
        let threshold = self.config.min_line_direction_norm;
        // Written so that a NaN norm fails too.
        if !(norm >= threshold) {
            tracing::warn!(landmark = ?landmark.id, norm, "cannot normalize degenerate image line");
            return Err(ProjectionError::DegenerateLine {
                landmark: landmark.id,
                norm,
                threshold,
            });
        }
        out.scale(1.0 / norm);
        Ok(())
    }

    /// Rejects points on the sensor's focal plane, whose pixel and Jacobians
    /// are not finite.
    fn check_point_depth(&self, landmark: &Landmark, out: &ProjectionOutput) -> Result<(), ProjectionError> {
        let threshold = self.config.min_point_depth;
        // NaN depths (a point at infinity along the focal plane) fail too.
        if !(out.depth.abs() >= threshold) {
            tracing::warn!(landmark = ?landmark.id, depth = out.depth, "cannot project point on the focal plane");
            return Err(ProjectionError::DegeneratePoint {
                landmark: landmark.id,
                depth: out.depth,
                threshold,
            });
        }
        Ok(())
    }
}

/// Projects the stored segment of a line landmark, with the covariance of each
/// endpoint. `line_visible` is left unset.
#[allow(clippy::too_many_arguments)]
fn predict_segment(
    map: &MapView,
    model: &dyn ProjectionModel,
    ctx: &ProjectionContext,
    robot: &Robot,
    sensor: &Sensor,
    landmark: &Landmark,
    state: &DVector<f64>,
    r: &DMatrix<f64>,
) -> Result<LinePrediction, ProjectionError> {
    let abscissas = landmark
        .abscissas()
        .ok_or(ProjectionError::MissingLineParams(landmark.id))?;
    let line = Vector6::from_column_slice(state.as_slice());
    let (segment, seg_l) = plucker_segment(&line, abscissas);

    let proj = model
        .project_segment(ctx, &segment)
        .ok_or_else(|| ProjectionError::SegmentProjectionUnsupported {
            sensor: sensor.kind.to_string(),
            landmark: landmark.kind.to_string(),
        })?;
    let visibility = visible_segment(&proj.endpoints, &proj.depths, &sensor.params.image_size);

    let s = state_selection(
        robot,
        sensor,
        landmark,
        dynamic(&proj.s_rf),
        dynamic(&proj.s_sf),
        dynamic(&(proj.s_seg * seg_l)),
    )?
    .propagate(map)?;

    let endpoints = [0, 1].map(|i| {
        let at = 2 * i;
        Endpoint {
            mean: proj.endpoints.fixed_rows::<2>(at).into_owned(),
            covariance: s.fixed_view::<2, 2>(at, at) + r.fixed_view::<2, 2>(at, at),
        }
    });

    Ok(LinePrediction {
        endpoints,
        depths: proj.depths,
        segment_visible: visibility.visible,
        line_visible: false,
    })
}

/// Pairs each map block an expectation depends on with its Jacobian: robot frame,
/// then the sensor frame when the filter estimates it, then the landmark.
fn state_selection(
    robot: &Robot,
    sensor: &Sensor,
    landmark: &Landmark,
    j_rf: DMatrix<f64>,
    j_sf: DMatrix<f64>,
    j_l: DMatrix<f64>,
) -> Result<StateSelection, ProjectionError> {
    let mut selection = StateSelection::new().with(robot.frame_range.clone(), j_rf)?;
    if let Some(range) = &sensor.frame_range {
        selection.push(range.clone(), j_sf)?;
    }
    selection.push(landmark.range.clone(), j_l)?;
    Ok(selection)
}

fn check_entities(
    map: &MapView,
    robot: &Robot,
    sensor: &Sensor,
    landmark: &Landmark,
) -> Result<(), ProjectionError> {
    if sensor.robot != robot.id {
        return Err(ProjectionError::SensorNotOnRobot {
            sensor: sensor.id,
            mounted_on: sensor.robot,
            robot: robot.id,
        });
    }
    check_block(map, &robot.frame_range, FRAME_STATE_DIM, "robot frame range", || {
        format!("robot {:?}", robot.id)
    })?;
    if let Some(range) = &sensor.frame_range {
        check_block(map, range, FRAME_STATE_DIM, "sensor frame range", || {
            format!("sensor {:?}", sensor.id)
        })?;
    }
    check_block(map, &landmark.range, landmark.kind.state_dim(), "landmark range", || {
        describe(landmark)
    })?;

    let mut blocks = vec![(format!("robot {:?}", robot.id), &robot.frame_range)];
    if let Some(range) = &sensor.frame_range {
        blocks.push((format!("sensor {:?}", sensor.id), range));
    }
    blocks.push((describe(landmark), &landmark.range));
    check_disjoint(&blocks)
}

fn check_disjoint(blocks: &[(String, &Range<usize>)]) -> Result<(), ProjectionError> {
    for (i, (first, a)) in blocks.iter().enumerate() {
        for (second, b) in &blocks[i + 1..] {
            if a.start < b.end && b.start < a.end {
                return Err(ProjectionError::OverlappingRanges {
                    first: first.clone(),
                    first_range: (*a).clone(),
                    second: second.clone(),
                    second_range: (*b).clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_block<F>(
    map: &MapView,
    range: &Range<usize>,
    dim: usize,
    what: &'static str,
    owner: F,
) -> Result<(), ProjectionError>
where
    F: FnOnce() -> String,
{
    map.check_range(range, owner)?;
    if range.len() != dim {
        return Err(ProjectionError::DimensionMismatch {
            what,
            expected: dim,
            found: range.len(),
        });
    }
    Ok(())
}

fn check_noise(
    model: &dyn ProjectionModel,
    landmark: &Landmark,
    r: &DMatrix<f64>,
) -> Result<(), ProjectionError> {
    let expected = if landmark.kind.is_line() {
        SEGMENT_MEASUREMENT_DIM
    } else {
        model.measurement_dim()
    };
    for found in [r.nrows(), r.ncols()] {
        if found != expected {
            return Err(ProjectionError::DimensionMismatch {
                what: "measurement noise",
                expected,
                found,
            });
        }
    }
    Ok(())
}

fn describe(landmark: &Landmark) -> String {
    format!("landmark {:?} ({})", landmark.id, landmark.kind)
}
