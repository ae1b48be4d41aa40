//! # Constants and type definitions for astrocarta
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `astrocarta` library. It also defines the planet identifier
//! enum that keys every per-body table in the crate.
//!
//! ## Overview
//!
//! - Astronomical constants (obliquity, Earth radius, epoch definitions)
//! - Unit conversions (degrees ↔ radians, arcseconds ↔ radians, days ↔ seconds)
//! - Core type aliases used across the crate
//! - [`Planet`] identifiers and the canonical iteration order
//! - The per-planet stationary-speed table used by the speed engine
//!
//! These definitions are used by all main modules, including the coordinate transforms,
//! the semi-diurnal-arc module, and the paran solver.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::astrocarta_errors::AstrocartaError;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-6;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const JD2000: f64 = 2_451_545.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

/// Number of days in a Julian century
pub const JULIAN_CENTURY: f64 = 36525.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Degrees of rotation per sidereal hour (15°/h)
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// Mean Earth radius in kilometers (IUGG spherical approximation)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean obliquity of the ecliptic at J2000.0, in degrees (IAU 2006, 84381.406″)
///
/// Only used when [`approximate_obliquity`](crate::params::CartaParams::approximate_obliquity)
/// is explicitly enabled; the default obliquity source is the ephemeris adapter.
pub const OBLIQUITY_J2000: f64 = 23.439_279_444_444_445;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Duration in hours
pub type Hours = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Angular rate in degrees per day
pub type DegreesPerDay = f64;

/// Julian Date (days, including fraction)
pub type JulianDay = f64;

/// Modified Julian Date (days)
pub type MJD = f64;

/// Lookup table from [`Planet`] to a per-body value.
///
/// Iteration order of this map is arbitrary; code producing ordered output
/// must iterate [`Planet::ALL`] and index into the map.
pub type PlanetMap<T> = HashMap<Planet, T, ahash::RandomState>;

// -------------------------------------------------------------------------------------------------
// Planet identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a chart body.
///
/// The ten classical bodies used by relocation astrology. The declaration
/// order is the canonical order used everywhere a pair `(i, j)` must be
/// stored without duplicates: `i < j` in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    /// All bodies in canonical order.
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    /// Position of this body in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stationary-speed threshold in degrees/day, `None` for bodies that
    /// never station.
    ///
    /// The apparent motion of the outer planets is slower, so their
    /// stations are declared at much smaller speeds than Mercury's.
    /// The Sun and Moon never retrograde and therefore never station.
    pub fn stationary_threshold(self) -> Option<DegreesPerDay> {
        match self {
            Planet::Sun | Planet::Moon => None,
            Planet::Mercury => Some(0.12),
            Planet::Venus => Some(0.06),
            Planet::Mars => Some(0.03),
            Planet::Jupiter => Some(0.01),
            Planet::Saturn => Some(0.005),
            Planet::Uranus => Some(0.002),
            Planet::Neptune => Some(0.001),
            Planet::Pluto => Some(0.001),
        }
    }

    /// Whether the body can ever be stationary/retrograde.
    pub fn can_station(self) -> bool {
        self.stationary_threshold().is_some()
    }
}

impl std::fmt::Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Planet {
    type Err = AstrocartaError;

    /// Parse a planet from its English name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" => Ok(Planet::Sun),
            "moon" => Ok(Planet::Moon),
            "mercury" => Ok(Planet::Mercury),
            "venus" => Ok(Planet::Venus),
            "mars" => Ok(Planet::Mars),
            "jupiter" => Ok(Planet::Jupiter),
            "saturn" => Ok(Planet::Saturn),
            "uranus" => Ok(Planet::Uranus),
            "neptune" => Ok(Planet::Neptune),
            "pluto" => Ok(Planet::Pluto),
            _ => Err(AstrocartaError::UnknownPlanet(s.to_string())),
        }
    }
}

#[cfg(test)]
mod constants_test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_canonical_order_is_indexable() {
        for (i, planet) in Planet::ALL.iter().enumerate() {
            assert_eq!(planet.index(), i);
        }
    }

    #[test]
    fn test_luminaries_never_station() {
        assert!(!Planet::Sun.can_station());
        assert!(!Planet::Moon.can_station());
        assert!(Planet::Mercury.can_station());
    }

    #[test]
    fn test_outer_thresholds_smaller_than_inner() {
        let mercury = Planet::Mercury.stationary_threshold().unwrap();
        let saturn = Planet::Saturn.stationary_threshold().unwrap();
        let pluto = Planet::Pluto.stationary_threshold().unwrap();
        assert!(mercury > saturn);
        assert!(saturn > pluto);
    }

    #[test]
    fn test_planet_from_str() {
        assert_eq!(Planet::from_str("mars").unwrap(), Planet::Mars);
        assert_eq!(Planet::from_str("MERCURY").unwrap(), Planet::Mercury);
        assert!(matches!(
            Planet::from_str("vulcan"),
            Err(AstrocartaError::UnknownPlanet(_))
        ));
    }

    #[test]
    fn test_round_trip_display_parse() {
        for planet in Planet::ALL {
            let parsed = Planet::from_str(&planet.to_string()).unwrap();
            assert_eq!(parsed, planet);
        }
    }
}
