//! # Position / declination / speed engine
//!
//! Composes the ephemeris adapter with the frame transforms to produce the
//! per-planet state every solver consumes: ecliptic positions, equatorial
//! coordinates (hence declinations), numerically differentiated longitude
//! speeds with retrograde/stationary flags, and a station-time search.
//!
//! Position maps are total over [`Planet::ALL`]: an adapter failure for any
//! single body fails the whole request rather than silently dropping the
//! planet from downstream pair iteration.

use serde::{Deserialize, Serialize};

use crate::astro_math::normalize_degrees_symmetric;
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{
    Degree, DegreesPerDay, JulianDay, Planet, PlanetMap, OBLIQUITY_J2000,
};
use crate::ephemeris::{Ephemeris, EclipticPosition};
use crate::params::CartaParams;
use crate::transforms::{ecliptic_to_equatorial, EquatorialCoord};

/// Per-planet state of one chart, computed once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPositions {
    /// Epoch of the chart
    pub jd: JulianDay,
    /// Geocentric ecliptic positions, total over [`Planet::ALL`]
    pub ecliptic: PlanetMap<EclipticPosition>,
    /// Equatorial coordinates derived with `obliquity`
    pub equatorial: PlanetMap<EquatorialCoord>,
    /// Obliquity used for the ecliptic → equatorial rotation, degrees
    pub obliquity: Degree,
    /// Greenwich sidereal time at `jd`, degrees [0°, 360°)
    pub sidereal_time: Degree,
}

impl ChartPositions {
    /// Compute the full per-planet state for a chart epoch.
    ///
    /// The obliquity comes from the adapter unless
    /// [`approximate_obliquity`](CartaParams::approximate_obliquity) is
    /// set, in which case the J2000 constant is used. The substitution is
    /// an explicit opt-in, never a silent fallback.
    pub fn compute<E: Ephemeris + ?Sized>(
        ephemeris: &E,
        jd: JulianDay,
        params: &CartaParams,
    ) -> Result<Self, AstrocartaError> {
        if !jd.is_finite() {
            return Err(AstrocartaError::InvalidInput(format!(
                "jd must be finite, got {jd}"
            )));
        }

        let obliquity = if params.approximate_obliquity {
            OBLIQUITY_J2000
        } else {
            ephemeris.true_obliquity(jd)
        };
        let sidereal_time = ephemeris.sidereal_time_degrees(jd);

        let ecliptic = all_positions(ephemeris, jd)?;
        let mut equatorial = PlanetMap::default();
        for planet in Planet::ALL {
            let position = &ecliptic[&planet];
            let coord =
                ecliptic_to_equatorial(position.longitude, position.latitude, obliquity)?;
            equatorial.insert(planet, coord);
        }

        Ok(ChartPositions {
            jd,
            ecliptic,
            equatorial,
            obliquity,
            sidereal_time,
        })
    }

    /// Equatorial coordinates of one planet.
    pub fn equatorial(&self, planet: Planet) -> EquatorialCoord {
        self.equatorial[&planet]
    }

    /// Declination of one planet, degrees.
    pub fn declination(&self, planet: Planet) -> Degree {
        self.equatorial[&planet].declination
    }

    /// Declinations of all planets.
    pub fn declinations(&self) -> PlanetMap<Degree> {
        let mut map = PlanetMap::default();
        for planet in Planet::ALL {
            map.insert(planet, self.declination(planet));
        }
        map
    }
}

/// Query the adapter once per planet; fails on the first adapter error or
/// non-finite position.
pub fn all_positions<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    jd: JulianDay,
) -> Result<PlanetMap<EclipticPosition>, AstrocartaError> {
    let mut map = PlanetMap::default();
    for planet in Planet::ALL {
        let position = ephemeris.body_position(jd, planet)?;
        if !position.is_finite() {
            return Err(AstrocartaError::NonFiniteEphemeris { planet, jd });
        }
        map.insert(planet, position);
    }
    Ok(map)
}

/// Declinations of all planets for a given obliquity.
pub fn declinations<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    jd: JulianDay,
    obliquity: Degree,
) -> Result<PlanetMap<Degree>, AstrocartaError> {
    let positions = all_positions(ephemeris, jd)?;
    let mut map = PlanetMap::default();
    for planet in Planet::ALL {
        let position = &positions[&planet];
        let coord = ecliptic_to_equatorial(position.longitude, position.latitude, obliquity)?;
        map.insert(planet, coord.declination);
    }
    Ok(map)
}

/// Motion state of one planet at the chart epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpeed {
    /// Longitude speed by central difference, degrees/day
    pub longitude_speed: DegreesPerDay,
    /// Speed below −ε (a strict threshold, so numerical noise around zero
    /// is not flagged)
    pub is_retrograde: bool,
    /// |speed| below the per-planet stationary threshold
    pub is_stationary: bool,
}

/// Central-difference longitude speed of one planet at `jd`.
///
/// The raw longitude difference is unwrapped across the 0°/360° boundary
/// before dividing by the step, so a planet crossing 0° Aries does not show
/// an absurd ±360°/day spike.
fn longitude_speed_at<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    planet: Planet,
    jd: JulianDay,
    step_days: f64,
) -> Result<DegreesPerDay, AstrocartaError> {
    let before = ephemeris.body_position(jd - step_days, planet)?;
    let after = ephemeris.body_position(jd + step_days, planet)?;
    if !before.is_finite() || !after.is_finite() {
        return Err(AstrocartaError::NonFiniteEphemeris { planet, jd });
    }

    let unwrapped = normalize_degrees_symmetric(after.longitude - before.longitude);
    Ok(unwrapped / (2.0 * step_days))
}

/// Longitude speeds and motion flags for all planets.
///
/// Arguments
/// ---------
/// * `ephemeris`: position source.
/// * `jd`: chart epoch.
/// * `params`: supplies the differentiation step
///   ([`speed_step_days`](CartaParams::speed_step_days)) and the
///   retrograde epsilon.
///
/// Return
/// ------
/// * Motion state per planet; the Sun and Moon are never retrograde or
///   stationary.
pub fn planet_speeds<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    jd: JulianDay,
    params: &CartaParams,
) -> Result<PlanetMap<PlanetSpeed>, AstrocartaError> {
    let mut map = PlanetMap::default();
    for planet in Planet::ALL {
        let speed = longitude_speed_at(ephemeris, planet, jd, params.speed_step_days)?;
        let is_retrograde =
            planet.can_station() && speed < -params.retrograde_epsilon;
        let is_stationary = match planet.stationary_threshold() {
            Some(threshold) => speed.abs() < threshold,
            None => false,
        };
        map.insert(
            planet,
            PlanetSpeed {
                longitude_speed: speed,
                is_retrograde,
                is_stationary,
            },
        );
    }
    Ok(map)
}

/// Direction of motion after a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// Direct → retrograde turn (speed crosses zero downward)
    Retrograde,
    /// Retrograde → direct turn (speed crosses zero upward)
    Direct,
}

/// A moment at which a planet's longitude speed crosses zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub planet: Planet,
    /// Station time, sub-day precision
    pub jd: JulianDay,
    pub kind: StationKind,
}

/// Find the next station of `planet` at or after `jd_start`.
///
/// Forward-steps at 1-day resolution looking for a sign change in the
/// longitude speed, then bisects within the bracketing day down to
/// [`station_time_tol_days`](CartaParams::station_time_tol_days).
///
/// Return
/// ------
/// * `Ok(None)` when the planet cannot station (Sun, Moon) or no sign
///   change occurs within
///   [`station_search_days`](CartaParams::station_search_days).
pub fn find_station<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    planet: Planet,
    jd_start: JulianDay,
    params: &CartaParams,
) -> Result<Option<Station>, AstrocartaError> {
    if !planet.can_station() {
        return Ok(None);
    }
    if !jd_start.is_finite() {
        return Err(AstrocartaError::InvalidInput(format!(
            "jd_start must be finite, got {jd_start}"
        )));
    }

    let speed_at = |t: JulianDay| longitude_speed_at(ephemeris, planet, t, params.speed_step_days);

    let days = params.station_search_days.ceil() as usize;
    let mut t_prev = jd_start;
    let mut v_prev = speed_at(t_prev)?;

    for day in 1..=days {
        let t = jd_start + day as f64;
        let v = speed_at(t)?;

        if v_prev * v < 0.0 {
            // Bracketed: refine inside [t_prev, t]
            let kind = if v_prev > 0.0 {
                StationKind::Retrograde
            } else {
                StationKind::Direct
            };

            let (mut lo, mut hi) = (t_prev, t);
            let mut v_lo = v_prev;
            for _ in 0..params.bisection_max_iter {
                if hi - lo < params.station_time_tol_days {
                    break;
                }
                let mid = 0.5 * (lo + hi);
                let v_mid = speed_at(mid)?;
                if v_lo * v_mid <= 0.0 {
                    hi = mid;
                } else {
                    lo = mid;
                    v_lo = v_mid;
                }
            }

            return Ok(Some(Station {
                planet,
                jd: 0.5 * (lo + hi),
                kind,
            }));
        }

        t_prev = t;
        v_prev = v;
    }

    Ok(None)
}

#[cfg(test)]
mod positions_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Linear motion: every planet advances at a fixed rate from a fixed
    /// longitude, except Mars which oscillates enough to retrograde.
    struct WavyEphemeris {
        epoch: JulianDay,
    }

    impl WavyEphemeris {
        const DRIFT: f64 = 0.2;
        const AMPLITUDE: f64 = 5.0;
        const FREQUENCY: f64 = 0.1;

        fn longitude(&self, planet: Planet, jd: JulianDay) -> f64 {
            let t = jd - self.epoch;
            let base = planet.index() as f64 * 30.0;
            if planet == Planet::Mars {
                base + Self::DRIFT * t + Self::AMPLITUDE * (Self::FREQUENCY * t).sin()
            } else {
                base + 0.98 * t
            }
        }
    }

    impl Ephemeris for WavyEphemeris {
        fn body_position(
            &self,
            jd: JulianDay,
            planet: Planet,
        ) -> Result<EclipticPosition, AstrocartaError> {
            Ok(EclipticPosition {
                longitude: self.longitude(planet, jd).rem_euclid(360.0),
                latitude: 0.0,
                distance: 1.0,
                longitude_speed: 0.0,
                latitude_speed: 0.0,
                distance_speed: 0.0,
            })
        }
    }

    fn fixture() -> (WavyEphemeris, CartaParams) {
        (WavyEphemeris { epoch: 2451545.0 }, CartaParams::default())
    }

    #[test]
    fn test_chart_positions_total_over_all_planets() {
        let (eph, params) = fixture();
        let chart = ChartPositions::compute(&eph, 2451545.0, &params).unwrap();
        assert_eq!(chart.ecliptic.len(), Planet::ALL.len());
        assert_eq!(chart.equatorial.len(), Planet::ALL.len());
    }

    #[test]
    fn test_speed_unwraps_zero_crossing() {
        // A body crossing 0° Aries must not show a ±360°/day spike
        struct CrossingZero;
        impl Ephemeris for CrossingZero {
            fn body_position(
                &self,
                jd: JulianDay,
                _planet: Planet,
            ) -> Result<EclipticPosition, AstrocartaError> {
                Ok(EclipticPosition {
                    longitude: (359.5 + 1.0 * (jd - 2451545.0)).rem_euclid(360.0),
                    latitude: 0.0,
                    distance: 1.0,
                    longitude_speed: 0.0,
                    latitude_speed: 0.0,
                    distance_speed: 0.0,
                })
            }
        }

        let params = CartaParams::default();
        let speeds = planet_speeds(&CrossingZero, 2451545.0, &params).unwrap();
        for planet in Planet::ALL {
            assert_abs_diff_eq!(speeds[&planet].longitude_speed, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_mars_retrograde_flagged() {
        let (eph, params) = fixture();
        // Around t=40d the oscillation drives Mars backward
        let speeds = planet_speeds(&eph, eph.epoch + 40.0, &params).unwrap();
        assert!(speeds[&Planet::Mars].is_retrograde);
        assert!(speeds[&Planet::Mars].longitude_speed < 0.0);
        // The steadily moving bodies are all direct
        assert!(!speeds[&Planet::Jupiter].is_retrograde);
    }

    #[test]
    fn test_luminaries_never_flagged() {
        let (eph, params) = fixture();
        let speeds = planet_speeds(&eph, eph.epoch + 40.0, &params).unwrap();
        assert!(!speeds[&Planet::Sun].is_retrograde);
        assert!(!speeds[&Planet::Sun].is_stationary);
        assert!(!speeds[&Planet::Moon].is_retrograde);
    }

    #[test]
    fn test_find_station_locates_zero_crossing() {
        let (eph, params) = fixture();

        // Central difference of the test motion:
        // v(t) = DRIFT + 2·AMPLITUDE·sin(F·h)/(2h) · cos(F·t), so the first
        // zero sits where cos(F·t) = −DRIFT·h/(AMPLITUDE·sin(F·h)).
        let h = params.speed_step_days;
        let gain = WavyEphemeris::AMPLITUDE * (WavyEphemeris::FREQUENCY * h).sin() / h;
        let expected =
            (-WavyEphemeris::DRIFT / gain).acos() / WavyEphemeris::FREQUENCY + eph.epoch;

        let station = find_station(&eph, Planet::Mars, eph.epoch, &params)
            .unwrap()
            .unwrap();
        assert_eq!(station.kind, StationKind::Retrograde);
        assert_abs_diff_eq!(station.jd, expected, epsilon = 2.0 * params.station_time_tol_days);
    }

    #[test]
    fn test_sun_and_moon_have_no_station() {
        let (eph, params) = fixture();
        assert_eq!(find_station(&eph, Planet::Sun, eph.epoch, &params).unwrap(), None);
        assert_eq!(find_station(&eph, Planet::Moon, eph.epoch, &params).unwrap(), None);
    }

    #[test]
    fn test_no_station_within_horizon() {
        let (eph, _) = fixture();
        let params = CartaParams::builder()
            .station_search_days(5.0)
            .build()
            .unwrap();
        // First Mars station is near +20d, outside a 5-day horizon
        assert_eq!(
            find_station(&eph, Planet::Mars, eph.epoch, &params).unwrap(),
            None
        );
    }
}
