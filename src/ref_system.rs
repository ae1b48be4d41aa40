//! # Reference-system angles
//!
//! Obliquity of the ecliptic, nutation, and sidereal time: the three
//! quantities tying the ecliptic frame delivered by an ephemeris to the
//! equatorial/horizon geometry the solvers work in.
//!
//! All public functions take a Julian Date and return **degrees**, the unit
//! every solver layer in this crate operates in. Nutation is evaluated with
//! an abridged IAU 1980 series (dominant lunisolar terms, ≲0.5″ error),
//! accurate enough to place the out-of-bounds boundary and the equation of
//! equinoxes, which shift by arcseconds, without carrying the full
//! hundred-term theory.

use crate::astro_math::normalize_degrees;
use crate::constants::{
    ArcSec, Degree, JulianDay, JD2000, JDTOMJD, JULIAN_CENTURY, RADEG, SECONDS_PER_DAY,
};
use crate::time::julian_centuries;

/// Mean obliquity of the ecliptic (IAU 1980), in degrees.
///
/// Cubic polynomial in Julian centuries since J2000, coefficients in
/// arcseconds, evaluated with Horner's method:
///
/// ```text
/// ε(T) = 84381.448″ − 46.8150″·T − 0.00059″·T² + 0.001813″·T³
/// ```
///
/// At J2000.0 this is 23°26′21.448″ ≈ 23.43929°.
///
/// See also
/// ------------
/// * [`true_obliquity`] – mean obliquity corrected for nutation.
pub fn mean_obliquity(jd: JulianDay) -> Degree {
    let t = julian_centuries(jd);
    let arcsec = ((0.001813 * t - 0.00059) * t - 46.8150) * t + 84381.448;
    arcsec / 3600.0
}

/// Nutation in longitude and obliquity (abridged IAU 1980 series).
///
/// Arguments
/// ---------
/// * `jd`: Julian Date (TT).
///
/// Return
/// ------
/// * A tuple `(Δψ, Δε)` in **arcseconds**:
///     - `Δψ`: nutation in longitude,
///     - `Δε`: nutation in obliquity.
///
/// Only the four dominant lunisolar terms are retained (the 18.6-year node
/// term plus the semiannual, semimonthly and fortnightly-node terms). The
/// truncation error stays below ~0.5″ in Δψ and ~0.1″ in Δε, a fraction of
/// the largest term's 17″ amplitude.
///
/// See also
/// ------------
/// * [`true_obliquity`] – applies Δε to the mean obliquity.
/// * [`apparent_sidereal_time`] – applies Δψ via the equation of equinoxes.
pub fn nutation(jd: JulianDay) -> (ArcSec, ArcSec) {
    let t = julian_centuries(jd);

    // Fundamental arguments, degrees
    let omega = 125.04452 - 1934.136_261 * t; // lunar ascending node
    let l_sun = 280.4665 + 36_000.7698 * t; // mean longitude of the Sun
    let l_moon = 218.3165 + 481_267.8813 * t; // mean longitude of the Moon

    let om = omega * RADEG;
    let two_ls = 2.0 * l_sun * RADEG;
    let two_lm = 2.0 * l_moon * RADEG;
    let two_om = 2.0 * om;

    let dpsi =
        -17.20 * om.sin() - 1.32 * two_ls.sin() - 0.23 * two_lm.sin() + 0.21 * two_om.sin();
    let deps = 9.20 * om.cos() + 0.57 * two_ls.cos() + 0.10 * two_lm.cos() - 0.09 * two_om.cos();

    (dpsi, deps)
}

/// True obliquity of the ecliptic (mean obliquity + nutation), in degrees.
///
/// This is the obliquity the out-of-bounds detector compares declinations
/// against; nutation moves the boundary by several arcseconds around its
/// mean value.
pub fn true_obliquity(jd: JulianDay) -> Degree {
    let (_, deps) = nutation(jd);
    mean_obliquity(jd) + deps / 3600.0
}

/// Greenwich Mean Sidereal Time in degrees, [0°, 360°).
///
/// Arguments
/// ---------
/// * `jd`: Julian Date (UT).
///
/// Formula
/// -------
/// IAU 1982 polynomial for GMST at 0ʰ UT, plus the sidereal rate applied to
/// the day fraction:
///
/// ```text
/// GMST₀ = 24110.54841 + 8640184.812866·T + 0.093104·T² − 6.2e-6·T³  [s]
/// GMST  = GMST₀ + 1.00273790934 × day-fraction
/// ```
///
/// where `T` counts Julian centuries of the preceding 0ʰ UT from J2000.
pub fn gmst_degrees(jd: JulianDay) -> Degree {
    // GMST at 0h UT polynomial coefficients, seconds
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;
    // Ratio of sidereal day to solar day
    const SIDEREAL_RATE: f64 = 1.00273790934;

    let mjd = jd - JDTOMJD;
    // Preceding 0h UT
    let day0 = mjd.floor();
    let t = (day0 + JDTOMJD - JD2000) / JULIAN_CENTURY;

    let gmst0_seconds = ((C3 * t + C2) * t + C1) * t + C0;
    let gmst0 = gmst0_seconds / SECONDS_PER_DAY * 360.0;

    let day_fraction = (mjd - day0) * 360.0;

    normalize_degrees(gmst0 + day_fraction * SIDEREAL_RATE)
}

/// Equation of the equinoxes `Δψ·cos ε`, in degrees.
fn equation_of_equinoxes(jd: JulianDay) -> Degree {
    let (dpsi, _) = nutation(jd);
    let eps = mean_obliquity(jd) * RADEG;
    dpsi * eps.cos() / 3600.0
}

/// Greenwich Apparent Sidereal Time in degrees, [0°, 360°).
///
/// GMST corrected by the equation of the equinoxes. This is the sidereal
/// time the ACG and paran solvers align right ascensions against.
pub fn apparent_sidereal_time(jd: JulianDay) -> Degree {
    normalize_degrees(gmst_degrees(jd) + equation_of_equinoxes(jd))
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_obliquity_j2000() {
        // 84381.448″ / 3600
        assert_abs_diff_eq!(mean_obliquity(JD2000), 23.439_291_111, epsilon = 1e-9);
    }

    #[test]
    fn test_mean_obliquity_decreases_with_time() {
        // Obliquity shrinks by ~47″ per century
        let eps_2000 = mean_obliquity(JD2000);
        let eps_2100 = mean_obliquity(JD2000 + JULIAN_CENTURY);
        assert!(eps_2100 < eps_2000);
        assert_abs_diff_eq!((eps_2000 - eps_2100) * 3600.0, 46.8150, epsilon = 0.01);
    }

    #[test]
    fn test_nutation_j2000() {
        // Full IAU 1980 theory gives (−13.92″, −5.77″) at J2000; the
        // abridged series must land within its documented truncation error.
        let (dpsi, deps) = nutation(JD2000);
        assert_abs_diff_eq!(dpsi, -13.923, epsilon = 0.5);
        assert_abs_diff_eq!(deps, -5.774, epsilon = 0.1);
    }

    #[test]
    fn test_true_obliquity_offset_is_arcseconds() {
        let mean = mean_obliquity(JD2000);
        let true_eps = true_obliquity(JD2000);
        let offset_arcsec = (true_eps - mean).abs() * 3600.0;
        assert!(offset_arcsec > 1.0 && offset_arcsec < 15.0);
    }

    #[test]
    fn test_gmst_j2000() {
        // Reference value: GMST at 2000-01-01 12:00 UT = 280.46062°
        assert_abs_diff_eq!(gmst_degrees(JD2000), 280.46062, epsilon = 5e-3);
    }

    #[test]
    fn test_gmst_advances_faster_than_solar_day() {
        // After exactly one solar day the sidereal clock has gained ~0.9856°
        let g0 = gmst_degrees(JD2000);
        let g1 = gmst_degrees(JD2000 + 1.0);
        let gained = crate::astro_math::normalize_degrees(g1 - g0);
        assert_abs_diff_eq!(gained, 0.9856, epsilon = 1e-3);
    }

    #[test]
    fn test_gmst_range() {
        for k in 0..50 {
            let g = gmst_degrees(JD2000 + k as f64 * 13.77);
            assert!((0.0..360.0).contains(&g));
        }
    }

    #[test]
    fn test_apparent_vs_mean_sidereal_time() {
        // Equation of the equinoxes stays within ±1.2″ ≈ 0.00033°
        let diff = apparent_sidereal_time(JD2000) - gmst_degrees(JD2000);
        assert!(diff.abs() < 0.01);
        assert!(diff.abs() > 0.0);
    }
}
