use crate::error::Error;
use crate::geo::{Wgs84, ecef_position, enu_to_ecef_rotation};
use crate::orientation::OrientationFrame;
use crate::scene::{CoverageStyle, PostProcessStage, SceneBackend, ShadowMapHandle, UniformValue};
use crate::sensor::SensorView;
use nalgebra::{Point3, Unit, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uom::si::f64::Angle;
use uom::si::{angle::radian, length::meter, ratio::ratio};

/// Viewing cameras farther than this from the sensor origin get no shadow
/// resources, in meters of straight-line ECEF distance.
pub const MAX_CAMERA_DISTANCE_M: f64 = 2_000.0;

const NEAR_PLANE_M: f64 = 0.1;

/// Virtual "light" camera a shadow map is rendered from: positioned at the
/// sensor, looking along the sensing direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShadowCamera {
    /// Sensor origin in world (ECEF) coordinates.
    pub position: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
    pub right: Unit<Vector3<f64>>,
    pub up: Unit<Vector3<f64>>,
    /// Vertical field of view, radians.
    pub fov_y: f64,
    /// `tan(hfov/2) / tan(vfov/2)`.
    pub aspect_ratio: f64,
    pub near: f64,
    /// Effective sensing range, meters.
    pub far: f64,
}

impl ShadowCamera {
    /// Builds the light camera for a sensor at `origin`.
    ///
    /// Pure and cheap; runs every frame a sensor is active. Returns `None`
    /// for invalid views; a degenerate pointing frame falls back to the
    /// neutral pose.
    pub fn synthesize(origin: &Wgs84, view: &SensorView) -> Option<Self> {
        if !view.is_valid() {
            return None;
        }

        let bearing = view.shadow_bearing()?;
        let enu_to_world = enu_to_ecef_rotation(origin);
        let frame = OrientationFrame::from_bearing(bearing, &enu_to_world).unwrap_or_else(|err| {
            warn!(%err, "shadow camera uses the neutral pose");
            OrientationFrame::identity()
        });

        let half_tangent = |fov: Angle| (fov / 2.0).tan().get::<ratio>();

        Some(Self {
            position: ecef_position(origin),
            direction: frame.direction(),
            right: frame.right(),
            up: frame.up(),
            fov_y: view.vertical_fov.get::<radian>(),
            aspect_ratio: half_tangent(view.horizontal_fov) / half_tangent(view.vertical_fov),
            near: NEAR_PLANE_M,
            far: view.range_or_default().get::<meter>(),
        })
    }

    /// Distance gate for shadow resources.
    pub fn within_activation_range(&self, viewing_camera: &Point3<f64>) -> bool {
        (viewing_camera - self.position).norm() <= MAX_CAMERA_DISTANCE_M
    }
}

/// Owns one sensor's shadow map and post-process stage on the backend.
///
/// Exactly one caster may exist per sensor at a time; whoever holds it must
/// finish [`ShadowCaster::destroy`] before creating a replacement.
pub struct ShadowCaster<B: SceneBackend> {
    camera: ShadowCamera,
    shadow_map: Option<B::ShadowMap>,
    stage: Option<B::Stage>,
    destroyed: bool,
}

impl<B: SceneBackend> ShadowCaster<B> {
    /// Creates the backend resources for `camera`. On failure nothing is
    /// leaked and the error is reported for the caller to log.
    pub fn create(backend: &mut B, camera: ShadowCamera, shader_source: &str) -> Result<Self, Error> {
        let shadow_map = backend.create_shadow_map(&camera)?;
        let stage = match backend.create_post_process_stage(shader_source) {
            Ok(stage) => stage,
            Err(err) => {
                backend.destroy_shadow_map(shadow_map);
                return Err(err);
            }
        };

        debug!("shadow caster created");
        Ok(Self {
            camera,
            shadow_map: Some(shadow_map),
            stage: Some(stage),
            destroyed: false,
        })
    }

    pub fn camera(&self) -> &ShadowCamera {
        &self.camera
    }

    /// Re-points the existing light camera in place; no backend resources
    /// change hands.
    pub fn update(&mut self, camera: ShadowCamera) -> Result<(), Error> {
        if self.destroyed {
            return Err(Error::Destroyed);
        }

        self.camera = camera;
        if let Some(shadow_map) = self.shadow_map.as_mut() {
            shadow_map.set_light_camera(&self.camera);
        }

        Ok(())
    }

    /// Per-frame hook: tracks shadow-map texture availability on the stage
    /// and feeds the frame's uniform values while enabled.
    pub fn pre_frame(&mut self, style: &CoverageStyle, exclude_terrain: bool) -> Result<(), Error> {
        if self.destroyed {
            return Err(Error::Destroyed);
        }

        let (Some(shadow_map), Some(stage)) = (self.shadow_map.as_ref(), self.stage.as_mut())
        else {
            return Ok(());
        };

        let ready = shadow_map.is_ready();
        stage.set_enabled(ready);
        if ready {
            for (name, value) in uniform_values(&self.camera, shadow_map, style, exclude_terrain) {
                stage.set_uniform(name, value);
            }
        }

        Ok(())
    }

    /// Releases the stage and shadow map. Idempotent; the caster refuses
    /// further work afterwards.
    pub fn destroy(&mut self, backend: &mut B) {
        if let Some(stage) = self.stage.take() {
            backend.destroy_post_process_stage(stage);
        }
        if let Some(shadow_map) = self.shadow_map.take() {
            backend.destroy_shadow_map(shadow_map);
        }

        if !self.destroyed {
            debug!("shadow caster destroyed");
        }
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// The per-frame uniform contract of the coverage post-process shader.
pub fn uniform_values(
    camera: &ShadowCamera,
    shadow_map: &impl ShadowMapHandle,
    style: &CoverageStyle,
    exclude_terrain: bool,
) -> Vec<(&'static str, UniformValue)> {
    fn vec3(v: &Unit<Vector3<f64>>) -> UniformValue {
        UniformValue::Vec3([v.x, v.y, v.z])
    }

    vec![
        (
            "u_shadow_projection",
            UniformValue::Mat4(shadow_map.projection_matrix()),
        ),
        (
            "u_light_position",
            UniformValue::Vec3([camera.position.x, camera.position.y, camera.position.z]),
        ),
        ("u_light_direction", vec3(&camera.direction)),
        ("u_light_up", vec3(&camera.up)),
        ("u_light_right", vec3(&camera.right)),
        (
            "u_cascade_count",
            UniformValue::Int(shadow_map.cascade_count() as i32),
        ),
        ("u_texel_size", UniformValue::Vec2(shadow_map.texel_size())),
        ("u_depth_bias", UniformValue::Float(shadow_map.depth_bias())),
        (
            "u_view_area_color",
            UniformValue::Vec4(style.view_area_color.map(f64::from)),
        ),
        (
            "u_shadow_area_color",
            UniformValue::Vec4(style.shadow_area_color.map(f64::from)),
        ),
        ("u_exclude_terrain", UniformValue::Bool(exclude_terrain)),
    ]
}
