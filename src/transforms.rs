//! # Coordinate transforms
//!
//! Transformations between the frames the solvers hop across: ecliptic ↔
//! equatorial (rotation by the obliquity), geodetic ↔ Cartesian on the unit
//! sphere, hour angle, equatorial → horizontal, and great-circle distance.
//!
//! Every function taking angular input validates it is finite and fails
//! with [`AstrocartaError::InvalidInput`] otherwise. A NaN slipping through
//! here would poison the sign comparisons inside the paran bisection search,
//! so corruption is stopped at this boundary rather than coerced.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::astro_math::{normalize_degrees, normalize_degrees_symmetric};
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, Kilometer, Radian, EARTH_RADIUS_KM, RADEG};

/// Equatorial coordinates of a body.
///
/// Derived deterministically from an ecliptic position and an obliquity;
/// carries no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoord {
    /// Right ascension in degrees, [0°, 360°)
    pub right_ascension: Degree,
    /// Declination in degrees, [−90°, 90°]
    pub declination: Degree,
}

/// Horizontal (observer-relative) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    /// Azimuth in degrees, [0°, 360°), North = 0°, East = 90°
    pub azimuth: Degree,
    /// Altitude above the horizon in degrees, [−90°, 90°]
    pub altitude: Degree,
}

fn ensure_finite(name: &str, value: f64) -> Result<(), AstrocartaError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AstrocartaError::InvalidInput(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Rotate ecliptic coordinates into the equatorial frame.
///
/// Arguments
/// ---------
/// * `longitude`: ecliptic longitude λ in degrees.
/// * `latitude`: ecliptic latitude β in degrees.
/// * `obliquity`: obliquity of the ecliptic ε in degrees.
///
/// Return
/// ------
/// * [`EquatorialCoord`] with right ascension normalized to [0°, 360°).
///
/// Formula
/// -------
/// ```text
/// sin δ = sin β cos ε + cos β sin ε sin λ
/// α     = atan2(sin λ cos ε − tan β sin ε, cos λ)
/// ```
///
/// `atan2` keeps the right ascension in the correct quadrant for any λ.
///
/// See also
/// ------------
/// * [`equatorial_to_ecliptic`] – inverse rotation.
pub fn ecliptic_to_equatorial(
    longitude: Degree,
    latitude: Degree,
    obliquity: Degree,
) -> Result<EquatorialCoord, AstrocartaError> {
    ensure_finite("longitude", longitude)?;
    ensure_finite("latitude", latitude)?;
    ensure_finite("obliquity", obliquity)?;

    let lambda = longitude * RADEG;
    let beta = latitude * RADEG;
    let eps = obliquity * RADEG;

    let sin_dec = beta.sin() * eps.cos() + beta.cos() * eps.sin() * lambda.sin();
    let declination = sin_dec.asin() / RADEG;

    let y = lambda.sin() * eps.cos() - beta.tan() * eps.sin();
    let x = lambda.cos();
    let right_ascension = normalize_degrees(y.atan2(x) / RADEG);

    Ok(EquatorialCoord {
        right_ascension,
        declination,
    })
}

/// Rotate equatorial coordinates back into the ecliptic frame.
///
/// Inverse of [`ecliptic_to_equatorial`]; returns `(λ, β)` in degrees with
/// the longitude normalized to [0°, 360°).
pub fn equatorial_to_ecliptic(
    right_ascension: Degree,
    declination: Degree,
    obliquity: Degree,
) -> Result<(Degree, Degree), AstrocartaError> {
    ensure_finite("right_ascension", right_ascension)?;
    ensure_finite("declination", declination)?;
    ensure_finite("obliquity", obliquity)?;

    let alpha = right_ascension * RADEG;
    let delta = declination * RADEG;
    let eps = obliquity * RADEG;

    let y = alpha.sin() * eps.cos() + delta.tan() * eps.sin();
    let x = alpha.cos();
    let longitude = normalize_degrees(y.atan2(x) / RADEG);

    let sin_beta = delta.sin() * eps.cos() - delta.cos() * eps.sin() * alpha.sin();
    let latitude = sin_beta.asin() / RADEG;

    Ok((longitude, latitude))
}

/// Geodetic latitude/longitude to a Cartesian vector on a sphere of radius `r`.
pub fn geo_to_cartesian(
    latitude: Degree,
    longitude: Degree,
    r: f64,
) -> Result<Vector3<f64>, AstrocartaError> {
    ensure_finite("latitude", latitude)?;
    ensure_finite("longitude", longitude)?;
    ensure_finite("r", r)?;

    let phi = latitude * RADEG;
    let lambda = longitude * RADEG;

    Ok(Vector3::new(
        r * phi.cos() * lambda.cos(),
        r * phi.cos() * lambda.sin(),
        r * phi.sin(),
    ))
}

/// Cartesian vector back to geodetic latitude/longitude, in degrees.
///
/// Return
/// ------
/// * `(latitude, longitude)` with longitude in (−180°, 180°].
///
/// Remarks
/// -------
/// * A zero vector has no direction; the result is `(0.0, 0.0)` rather
///   than NaN.
pub fn cartesian_to_geo(position: &Vector3<f64>) -> (Degree, Degree) {
    let norm = position.norm();
    if norm == 0.0 {
        return (0.0, 0.0);
    }

    let latitude = (position.z / norm).asin() / RADEG;
    let longitude = position.y.atan2(position.x) / RADEG;

    (latitude, longitude)
}

/// Hour angle of a body: local sidereal time minus right ascension,
/// normalized to (−180°, 180°].
///
/// Negative east of the meridian (body still rising toward culmination),
/// positive west.
pub fn hour_angle(
    local_sidereal_time: Degree,
    right_ascension: Degree,
) -> Result<Degree, AstrocartaError> {
    ensure_finite("local_sidereal_time", local_sidereal_time)?;
    ensure_finite("right_ascension", right_ascension)?;

    Ok(normalize_degrees_symmetric(
        local_sidereal_time - right_ascension,
    ))
}

/// Equatorial coordinates to horizontal azimuth/altitude for an observer.
///
/// Arguments
/// ---------
/// * `hour_angle`: body hour angle H in degrees.
/// * `declination`: body declination δ in degrees.
/// * `latitude`: observer geodetic latitude φ in degrees.
///
/// Return
/// ------
/// * [`HorizontalCoord`]; azimuth measured from North through East
///   (N = 0°, E = 90°), obtained by offsetting the south-referenced
///   `atan2` result by 180° before normalization.
pub fn equatorial_to_horizontal(
    hour_angle: Degree,
    declination: Degree,
    latitude: Degree,
) -> Result<HorizontalCoord, AstrocartaError> {
    ensure_finite("hour_angle", hour_angle)?;
    ensure_finite("declination", declination)?;
    ensure_finite("latitude", latitude)?;

    let h = hour_angle * RADEG;
    let delta = declination * RADEG;
    let phi = latitude * RADEG;

    let sin_alt = delta.sin() * phi.sin() + delta.cos() * phi.cos() * h.cos();
    let altitude = sin_alt.asin() / RADEG;

    let az_south = h.sin().atan2(h.cos() * phi.sin() - delta.tan() * phi.cos()) / RADEG;
    let azimuth = normalize_degrees(az_south + 180.0);

    Ok(HorizontalCoord { azimuth, altitude })
}

/// Great-circle angular distance between two points, in radians (haversine).
pub fn great_circle_distance(
    lat1: Degree,
    lon1: Degree,
    lat2: Degree,
    lon2: Degree,
) -> Result<Radian, AstrocartaError> {
    ensure_finite("lat1", lat1)?;
    ensure_finite("lon1", lon1)?;
    ensure_finite("lat2", lat2)?;
    ensure_finite("lon2", lon2)?;

    let phi1 = lat1 * RADEG;
    let phi2 = lat2 * RADEG;
    let d_phi = (lat2 - lat1) * RADEG;
    let d_lambda = (lon2 - lon1) * RADEG;

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    Ok(2.0 * a.sqrt().atan2((1.0 - a).sqrt()))
}

/// Great-circle distance in kilometers on the mean Earth sphere.
pub fn great_circle_distance_km(
    lat1: Degree,
    lon1: Degree,
    lat2: Degree,
    lon2: Degree,
) -> Result<Kilometer, AstrocartaError> {
    Ok(great_circle_distance(lat1, lon1, lat2, lon2)? * EARTH_RADIUS_KM)
}
