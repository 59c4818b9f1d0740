use crate::error::Error;
use crate::geo::SensorEnu;
use crate::math::{basis_from_columns, safe_normalize};
use nalgebra::{Rotation3, Unit, UnitQuaternion, Vector3};
use sguaba::Bearing;
use uom::si::angle::radian;

/// Orthonormal pointing frame of a sensor in the world (ECEF) frame.
///
/// The three axes stay mutually orthogonal unit vectors by construction;
/// any input that would break that property is rejected while solving
/// rather than smuggled out as a near-garbage frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationFrame {
    direction: Unit<Vector3<f64>>,
    right: Unit<Vector3<f64>>,
    up: Unit<Vector3<f64>>,
}

impl OrientationFrame {
    /// Neutral fallback pose: the identity rotation, looking down local -Z.
    pub fn identity() -> Self {
        Self {
            direction: -Vector3::z_axis(),
            right: Vector3::x_axis(),
            up: Vector3::y_axis(),
        }
    }

    /// Solves the world-frame pointing frame for a bearing expressed in the
    /// local East-North-Up frame whose axes `enu_to_world` carries into the
    /// world frame.
    ///
    /// Fails with [`Error::DegenerateOrientation`] when any intermediate
    /// vector collapses (straight up or straight down leaves no horizontal
    /// component to derive a right vector from). Callers choose the fallback
    /// policy, typically [`OrientationFrame::identity`].
    pub fn from_bearing(
        bearing: Bearing<SensorEnu>,
        enu_to_world: &Rotation3<f64>,
    ) -> Result<Self, Error> {
        let azimuth = bearing.azimuth().get::<radian>();
        let elevation = bearing.elevation().get::<radian>();

        // Azimuth turns clockwise from local North; elevation lifts toward Up.
        let local_direction = Vector3::new(
            azimuth.sin() * elevation.cos(),
            azimuth.cos() * elevation.cos(),
            elevation.sin(),
        );

        let local_right = safe_normalize(local_direction.cross(&Vector3::z()))
            .ok_or(Error::DegenerateOrientation { step: "local right" })?;

        // Re-orthogonalize up against the pointing direction.
        let local_up = safe_normalize(local_right.cross(&local_direction))
            .ok_or(Error::DegenerateOrientation { step: "local up" })?;

        let direction = safe_normalize(enu_to_world * local_direction)
            .ok_or(Error::DegenerateOrientation { step: "world direction" })?;
        let right = safe_normalize(enu_to_world * local_right.into_inner())
            .ok_or(Error::DegenerateOrientation { step: "world right" })?;
        let up = safe_normalize(enu_to_world * local_up.into_inner())
            .ok_or(Error::DegenerateOrientation { step: "world up" })?;

        Ok(Self {
            direction,
            right,
            up,
        })
    }

    pub fn direction(&self) -> Unit<Vector3<f64>> {
        self.direction
    }

    pub fn right(&self) -> Unit<Vector3<f64>> {
        self.right
    }

    pub fn up(&self) -> Unit<Vector3<f64>> {
        self.up
    }

    /// Camera-convention rotation: columns are right, up, and backward,
    /// so local -Z is the pointing direction.
    pub fn rotation(&self) -> Rotation3<f64> {
        basis_from_columns(self.right, self.up, -self.direction)
    }

    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_rotation_matrix(&self.rotation())
    }
}
