use crate::geo::SensorEnu;
use crate::math::wrap_azimuth;
use sguaba::Bearing;
use uom::ConstZero;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

/// Range substituted when a sensor reports none, in meters.
pub const DEFAULT_VISUALIZATION_RANGE_M: f64 = 100.0;

/// Pointing direction and sensing-volume shape of one sensor.
///
/// Azimuth may be any real angle and is wrapped into `[0, 360)` degrees
/// before use. Both fields of view must sit strictly inside (0, 180)
/// degrees; a missing range falls back to [`DEFAULT_VISUALIZATION_RANGE_M`].
/// Consumers produce no geometry at all for an invalid view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorView {
    pub azimuth: Angle,
    pub elevation: Angle,
    pub horizontal_fov: Angle,
    pub vertical_fov: Angle,
    pub range: Option<Length>,
}

impl SensorView {
    pub fn is_valid(&self) -> bool {
        fn fov_ok(fov: Angle) -> bool {
            fov.is_finite() && Angle::ZERO < fov && fov < Angle::HALF_TURN
        }

        self.azimuth.is_finite()
            && self.elevation.is_finite()
            && fov_ok(self.horizontal_fov)
            && fov_ok(self.vertical_fov)
            && self
                .range
                .is_none_or(|range| range.is_finite() && range > Length::ZERO)
    }

    pub fn range_or_default(&self) -> Length {
        self.range
            .unwrap_or_else(|| Length::new::<meter>(DEFAULT_VISUALIZATION_RANGE_M))
    }

    /// Bearing the sensor points along, used for the frustum outline.
    ///
    /// Azimuth turns clockwise from local North; positive elevation is up.
    /// Returns `None` when the elevation leaves `[-90, 90]` degrees.
    pub fn pointing_bearing(&self) -> Option<Bearing<SensorEnu>> {
        let builder = Bearing::<SensorEnu>::builder()
            .azimuth(wrap_azimuth(self.azimuth))
            .elevation(self.elevation)?;

        Some(builder.build())
    }

    /// Bearing for the shadow-projection pass.
    ///
    /// The shadow pass references azimuth half a turn from the outline
    /// convention, and the elevation sign is flipped here, exactly once;
    /// the orientation solver applies no further inversion.
    pub fn shadow_bearing(&self) -> Option<Bearing<SensorEnu>> {
        let builder = Bearing::<SensorEnu>::builder()
            .azimuth(wrap_azimuth(self.azimuth + Angle::HALF_TURN))
            .elevation(-self.elevation)?;

        Some(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::degree;

    fn view(azimuth: f64, elevation: f64, hfov: f64, vfov: f64, range: Option<f64>) -> SensorView {
        SensorView {
            azimuth: Angle::new::<degree>(azimuth),
            elevation: Angle::new::<degree>(elevation),
            horizontal_fov: Angle::new::<degree>(hfov),
            vertical_fov: Angle::new::<degree>(vfov),
            range: range.map(Length::new::<meter>),
        }
    }

    #[rstest]
    #[case(view(0.0, 0.0, 60.0, 40.0, Some(150.0)), true)]
    #[case(view(720.0, -45.0, 60.0, 40.0, None), true)]
    #[case(view(0.0, 0.0, 0.0, 40.0, None), false)]
    #[case(view(0.0, 0.0, 60.0, 180.0, None), false)]
    #[case(view(0.0, 0.0, 60.0, -10.0, None), false)]
    #[case(view(f64::NAN, 0.0, 60.0, 40.0, None), false)]
    #[case(view(0.0, f64::INFINITY, 60.0, 40.0, None), false)]
    #[case(view(0.0, 0.0, 60.0, 40.0, Some(0.0)), false)]
    #[case(view(0.0, 0.0, 60.0, 40.0, Some(-5.0)), false)]
    #[case(view(0.0, 0.0, 60.0, 40.0, Some(f64::NAN)), false)]
    fn validity(#[case] view: SensorView, #[case] expected: bool) {
        assert_eq!(view.is_valid(), expected);
    }

    #[test]
    fn missing_range_uses_the_default() {
        let view = view(0.0, 0.0, 60.0, 40.0, None);
        assert_relative_eq!(
            view.range_or_default().get::<meter>(),
            DEFAULT_VISUALIZATION_RANGE_M
        );
    }

    #[test]
    fn pointing_bearing_wraps_azimuth() {
        let bearing = view(450.0, 10.0, 60.0, 40.0, None)
            .pointing_bearing()
            .expect("elevation is in range");

        assert_relative_eq!(bearing.azimuth().get::<degree>(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(bearing.elevation().get::<degree>(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_elevation_yields_no_bearing() {
        assert!(view(0.0, 100.0, 60.0, 40.0, None).pointing_bearing().is_none());
    }

    #[test]
    fn shadow_bearing_flips_the_conventions() {
        let bearing = view(0.0, -45.0, 60.0, 40.0, None)
            .shadow_bearing()
            .expect("negated elevation is in range");

        assert_relative_eq!(bearing.azimuth().get::<degree>(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(bearing.elevation().get::<degree>(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn shadow_bearing_applies_a_single_elevation_flip() {
        let up = view(90.0, 30.0, 60.0, 40.0, None)
            .shadow_bearing()
            .expect("negated elevation is in range");

        assert_relative_eq!(up.azimuth().get::<degree>(), 270.0, epsilon = 1e-9);
        assert_relative_eq!(up.elevation().get::<degree>(), -30.0, epsilon = 1e-9);
    }
}
