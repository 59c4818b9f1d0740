use crate::error::Error;
use crate::shadow::ShadowCamera;
use nalgebra::{Matrix4, Point3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value fed to a post-process shader uniform.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f64),
    Int(i32),
    Bool(bool),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Mat4(Matrix4<f64>),
}

/// Depth texture rendered from the sensor's light camera, owned by the
/// scene engine.
pub trait ShadowMapHandle {
    /// Re-points the light camera without recreating the depth texture.
    fn set_light_camera(&mut self, camera: &ShadowCamera);

    fn projection_matrix(&self) -> Matrix4<f64>;

    fn texel_size(&self) -> [f64; 2];

    fn depth_bias(&self) -> f64;

    fn cascade_count(&self) -> u32;

    /// Whether the depth texture exists and can be sampled this frame.
    fn is_ready(&self) -> bool;
}

/// Full-screen pass that samples a shadow map and tints covered ground.
pub trait PostProcessStage {
    fn set_enabled(&mut self, enabled: bool);

    fn set_uniform(&mut self, name: &'static str, value: UniformValue);
}

/// The scene-rendering engine the computed geometry is handed to.
///
/// The crate owns which resources exist and what they are fed; the engine
/// owns the GPU. Light-camera vectors cross this boundary in world space;
/// the engine converts to eye space where its shaders need it, since it
/// holds the view matrix.
pub trait SceneBackend {
    type ShadowMap: ShadowMapHandle;
    type Stage: PostProcessStage;

    fn create_shadow_map(&mut self, camera: &ShadowCamera) -> Result<Self::ShadowMap, Error>;

    fn create_post_process_stage(&mut self, shader_source: &str) -> Result<Self::Stage, Error>;

    fn destroy_shadow_map(&mut self, shadow_map: Self::ShadowMap);

    fn destroy_post_process_stage(&mut self, stage: Self::Stage);

    /// Draws disjoint line segments given as flattened endpoint pairs.
    fn submit_polyline(&mut self, points: &[Point3<f64>], width: f32, color: [f32; 4]);

    /// Draws a solid viewing volume: apex plus base corners, one color per
    /// instance.
    fn submit_frustum(&mut self, apex: Point3<f64>, corners: &[Point3<f64>; 4], color: [f32; 4]);

    /// Viewing camera position in the world frame.
    fn camera_position(&self) -> Point3<f64>;

    /// True when the active terrain provider is a flat/no-op provider, in
    /// which case terrain shadowing is excluded in the post-process pass.
    fn terrain_is_flat(&self) -> bool;
}

/// Colors for the coverage overlay; alpha is folded into each color.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoverageStyle {
    pub view_area_color: [f32; 4],
    pub shadow_area_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub outline_width: f32,
    pub volume_color: [f32; 4],
}

impl Default for CoverageStyle {
    fn default() -> Self {
        Self {
            view_area_color: [0.0, 1.0, 0.0, 0.5],
            shadow_area_color: [1.0, 0.0, 0.0, 0.5],
            outline_color: [1.0, 1.0, 1.0, 1.0],
            outline_width: 2.0,
            volume_color: [1.0, 1.0, 1.0, 0.15],
        }
    }
}
