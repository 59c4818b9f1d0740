use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use sguaba::system;
use uom::si::{angle::radian, length::meter};

pub use sguaba::systems::Wgs84;

// Local East-North-Up tangent frame at a sensor's position.
system!(pub struct SensorEnu using ENU);

const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
const WGS84_FIRST_ECCENTRICITY_SQ: f64 = 0.006_694_379_990_141_317;

/// Rotation taking local East-North-Up coordinates at `origin` into the
/// earth-centered, earth-fixed frame. A pure function of latitude and
/// longitude; height only moves the origin, never the axes.
pub fn enu_to_ecef_rotation(origin: &Wgs84) -> Rotation3<f64> {
    let (sin_lat, cos_lat) = origin.latitude().get::<radian>().sin_cos();
    let (sin_lon, cos_lon) = origin.longitude().get::<radian>().sin_cos();

    let east = Vector3::new(-sin_lon, cos_lon, 0.0);
    let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let up = Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);

    Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[east, north, up]))
}

/// Earth-centered, earth-fixed position of `origin` on the WGS84 ellipsoid.
pub fn ecef_position(origin: &Wgs84) -> Point3<f64> {
    let lat = origin.latitude().get::<radian>();
    let lon = origin.longitude().get::<radian>();
    let height = origin.altitude().get::<meter>();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    // Prime vertical radius of curvature at this latitude.
    let n = WGS84_SEMI_MAJOR_AXIS_M
        / (1.0 - WGS84_FIRST_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

    Point3::new(
        (n + height) * cos_lat * cos_lon,
        (n + height) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_FIRST_ECCENTRICITY_SQ) + height) * sin_lat,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;
    use uom::ConstZero;
    use uom::si::f64::{Angle, Length};
    use uom::si::{angle::degree, length::meter};

    fn wgs84(lat: f64, lon: f64, height: f64) -> Wgs84 {
        Wgs84::builder()
            .latitude(Angle::new::<degree>(lat))
            .expect("latitude is between -90 and 90")
            .longitude(Angle::new::<degree>(lon))
            .altitude(Length::new::<meter>(height))
            .build()
    }

    #[test]
    fn enu_axes_at_null_island() {
        let rotation = enu_to_ecef_rotation(&wgs84(0.0, 0.0, 0.0));

        // At lat 0, lon 0: east is ECEF +Y, north is +Z, up is +X.
        assert_relative_eq!(rotation * Vector3::x(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(rotation * Vector3::y(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(rotation * Vector3::z(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn height_does_not_change_the_axes() {
        let at_ellipsoid = enu_to_ecef_rotation(&wgs84(40.7331, -73.9844, 0.0));
        let aloft = enu_to_ecef_rotation(&wgs84(40.7331, -73.9844, 5000.0));

        assert_relative_eq!(at_ellipsoid.matrix(), aloft.matrix());
    }

    quickcheck! {
        fn enu_rotation_is_orthonormal(lat_seed: i8, lon_seed: i16) -> bool {
            let lat = lat_seed as f64 * 89.0 / i8::MAX as f64;
            let lon = lon_seed as f64 * 180.0 / i16::MAX as f64;
            let rotation = enu_to_ecef_rotation(&wgs84(lat, lon, 0.0));

            let gram = rotation.matrix() * rotation.matrix().transpose();
            (gram - Matrix3::identity()).norm() < 1e-9
        }
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0, [6_378_137.0, 0.0, 0.0])]
    #[case(0.0, 90.0, 0.0, [0.0, 6_378_137.0, 0.0])]
    #[case(90.0, 0.0, 0.0, [0.0, 0.0, 6_356_752.314_245])]
    #[case(0.0, 0.0, 100.0, [6_378_237.0, 0.0, 0.0])]
    fn ecef_matches_reference_points(
        #[case] lat: f64,
        #[case] lon: f64,
        #[case] height: f64,
        #[case] expected: [f64; 3],
    ) {
        let position = ecef_position(&wgs84(lat, lon, height));
        assert_relative_eq!(position.x, expected[0], epsilon = 1e-3);
        assert_relative_eq!(position.y, expected[1], epsilon = 1e-3);
        assert_relative_eq!(position.z, expected[2], epsilon = 1e-3);
    }

    #[test]
    fn altitude_defaults_to_the_ellipsoid() {
        let position = Wgs84::builder()
            .latitude(Angle::new::<degree>(44.2187))
            .expect("latitude is between -90 and 90")
            .longitude(Angle::new::<degree>(-76.4747))
            .altitude(Length::ZERO)
            .build();

        let on_ellipsoid = ecef_position(&position);
        assert_relative_eq!(
            on_ellipsoid.coords.norm(),
            6_367_838.0,
            epsilon = 5_000.0
        );
    }
}
