use crate::geo::{Wgs84, ecef_position, enu_to_ecef_rotation};
use crate::orientation::OrientationFrame;
use crate::sensor::SensorView;
use nalgebra::{Point3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;
use uom::si::{angle::radian, length::meter};

// Outline corners sit inside the true half-FOV edge.
const CORNER_ANGLE_DIVISOR: f64 = 3.0;

/// Wireframe of a sensor's viewing volume: four apex-to-corner spokes plus
/// the base rectangle, in world (ECEF) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrustumOutline {
    apex: Point3<f64>,
    corners: [Point3<f64>; 4],
}

impl FrustumOutline {
    /// Computes the outline for a sensor at `origin`.
    ///
    /// Returns `None` for invalid views and for elevations outside
    /// `[-90, 90]` degrees. A degenerate pointing frame falls back to the
    /// neutral pose so the outline still renders, axis-aligned.
    pub fn compute(origin: &Wgs84, view: &SensorView) -> Option<Self> {
        if !view.is_valid() {
            return None;
        }

        let bearing = view.pointing_bearing()?;
        let enu_to_world = enu_to_ecef_rotation(origin);
        let frame = OrientationFrame::from_bearing(bearing, &enu_to_world).unwrap_or_else(|err| {
            warn!(%err, "drawing frustum outline with the neutral pose");
            OrientationFrame::identity()
        });

        let rotation = frame.rotation();
        let apex = ecef_position(origin);
        let range = view.range_or_default().get::<meter>();

        let rel_h = view.horizontal_fov.get::<radian>() / CORNER_ANGLE_DIVISOR;
        let rel_v = view.vertical_fov.get::<radian>() / CORNER_ANGLE_DIVISOR;
        let x = rel_h.tan() * range;
        let y = rel_v.tan() * range;

        // Bottom-left, bottom-right, top-right, top-left; local -Z is forward.
        let corners = [
            Vector3::new(-x, -y, -range),
            Vector3::new(x, -y, -range),
            Vector3::new(x, y, -range),
            Vector3::new(-x, y, -range),
        ]
        .map(|local| apex + rotation * local);

        Some(Self { apex, corners })
    }

    pub fn apex(&self) -> Point3<f64> {
        self.apex
    }

    pub fn corners(&self) -> &[Point3<f64>; 4] {
        &self.corners
    }

    /// The eight line segments of the wireframe: four spokes, then the base
    /// rectangle walked bottom-left → bottom-right → top-right → top-left.
    pub fn segments(&self) -> [[Point3<f64>; 2]; 8] {
        let [bl, br, tr, tl] = self.corners;

        [
            [self.apex, bl],
            [self.apex, br],
            [self.apex, tr],
            [self.apex, tl],
            [bl, br],
            [br, tr],
            [tr, tl],
            [tl, bl],
        ]
    }

    /// Segment endpoints flattened for a renderer drawing disjoint pairs;
    /// always 16 points.
    pub fn polyline_points(&self) -> Vec<Point3<f64>> {
        self.segments().iter().flatten().copied().collect()
    }
}
