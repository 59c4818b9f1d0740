use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use uom::ConstZero;
use uom::si::f64::Angle;

/// Norm-squared at or below this is treated as a zero-length vector.
pub const DEGENERACY_EPSILON: f64 = 1.0e-10;

/// Normalizes `v`, refusing vectors with near-zero magnitude.
pub fn safe_normalize(v: Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    if v.norm_squared() <= DEGENERACY_EPSILON {
        return None;
    }
    Some(Unit::new_normalize(v))
}

/// Rotation whose columns are the supplied orthonormal basis vectors.
pub fn basis_from_columns(
    right: Unit<Vector3<f64>>,
    up: Unit<Vector3<f64>>,
    backward: Unit<Vector3<f64>>,
) -> Rotation3<f64> {
    Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
        right.into_inner(),
        up.into_inner(),
        backward.into_inner(),
    ]))
}

/// Wraps `angle` into `[0, 360)` degrees. Non-finite angles pass through
/// unchanged so validity checks can reject them.
pub fn wrap_azimuth(mut angle: Angle) -> Angle {
    if !angle.is_finite() {
        return angle;
    }

    while angle >= Angle::FULL_TURN {
        angle -= Angle::FULL_TURN;
    }

    while angle < Angle::ZERO {
        angle += Angle::FULL_TURN;
    }

    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_relative_eq, relative_eq};
    use quickcheck::quickcheck;
    use uom::si::angle::degree;

    quickcheck! {
        fn wrapped_azimuth_is_in_range(azimuth_seed: i32) -> bool {
            let wrapped = wrap_azimuth(Angle::new::<degree>(azimuth_seed as f64 / 7.));
            Angle::ZERO <= wrapped && wrapped < Angle::FULL_TURN
        }

        fn wrapping_ignores_whole_turns(azimuth_seed: i16, turns: i8) -> bool {
            let azimuth = Angle::new::<degree>(azimuth_seed as f64 / 10.);
            let shifted = azimuth + Angle::FULL_TURN * turns as f64;

            relative_eq!(
                wrap_azimuth(azimuth).get::<degree>(),
                wrap_azimuth(shifted).get::<degree>(),
                epsilon = 1e-9
            )
        }
    }

    #[test]
    fn wrapping_passes_non_finite_through() {
        assert!(wrap_azimuth(Angle::new::<degree>(f64::NAN)).is_nan());
        assert!(!wrap_azimuth(Angle::new::<degree>(f64::INFINITY)).is_finite());
    }

    #[test]
    fn normalizing_a_zero_vector_fails() {
        assert!(safe_normalize(Vector3::zeros()).is_none());
        assert!(safe_normalize(Vector3::new(1e-8, 0.0, 0.0)).is_none());
    }

    #[test]
    fn normalizing_yields_a_unit_vector() {
        let unit = safe_normalize(Vector3::new(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(unit.norm(), 1.0);
        assert_relative_eq!(unit.x, 0.6);
        assert_relative_eq!(unit.y, 0.8);
    }

    #[test]
    fn basis_columns_are_preserved() {
        let rotation = basis_from_columns(Vector3::y_axis(), Vector3::z_axis(), Vector3::x_axis());

        assert_relative_eq!(rotation * Vector3::x(), Vector3::y());
        assert_relative_eq!(rotation * Vector3::y(), Vector3::z());
        assert_relative_eq!(rotation * Vector3::z(), Vector3::x());
    }
}
