//! Sensor coverage geometry for 3D geospatial maps.
//!
//! Converts a device's position, pointing direction, and field of view into
//! the world-space geometry a scene engine needs to draw coverage: a frustum
//! wireframe outline ([`outline::FrustumOutline`]) and a shadow-projection
//! "light" camera ([`shadow::ShadowCamera`]) whose depth pass classifies
//! ground as visible to the sensor or occluded.
//!
//! The crate is pure geometry plus a thin resource-lifecycle layer
//! ([`layer::CoverageLayer`]); all drawing happens behind the
//! [`scene::SceneBackend`] trait.

pub mod error;
pub mod geo;
pub mod layer;
pub mod math;
pub mod orientation;
pub mod outline;
pub mod scene;
pub mod sensor;
pub mod shader;
pub mod shadow;

pub mod prelude {
    pub use crate::error::Error;
    pub use crate::geo::{SensorEnu, Wgs84};
    pub use crate::layer::{CoverageLayer, SensorId};
    pub use crate::orientation::OrientationFrame;
    pub use crate::outline::FrustumOutline;
    pub use crate::scene::{
        CoverageStyle, PostProcessStage, SceneBackend, ShadowMapHandle, UniformValue,
    };
    pub use crate::sensor::SensorView;
    pub use crate::shader::{COVERAGE_SHADER_PATH, ShaderHandle, ShaderState};
    pub use crate::shadow::{MAX_CAMERA_DISTANCE_M, ShadowCamera, ShadowCaster};
}
