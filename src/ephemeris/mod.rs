//! # Ephemeris boundary
//!
//! The solvers never compute planetary positions themselves; they consume
//! them through the [`Ephemeris`] trait. An implementor wraps whatever
//! source the application has: a JPL kernel binding, a VSOP series, or the
//! bundled [`ChartKernel`](kernel::ChartKernel) interpolation table used by
//! the test suite and benches.
//!
//! The contract is **stateless**: every method takes the Julian Date
//! explicitly, construction of an implementor is its one-time
//! initialization, and the handle is immutable afterwards. There is no
//! observer position on the adapter (all positions are geocentric), so a
//! single handle can be shared across threads freely (`Send + Sync` is part
//! of the trait bound).

use serde::{Deserialize, Serialize};

use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, DegreesPerDay, JulianDay, Planet};
use crate::ref_system;

pub mod kernel;

/// Geocentric ecliptic position of a body at one epoch.
///
/// The value an ephemeris source reports: ecliptic longitude/latitude in
/// degrees, distance in AU, and the source's own rates of change. The speed
/// engine re-derives longitude speed by central difference and does not
/// rely on `longitude_speed` alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    /// Ecliptic longitude in degrees, [0°, 360°)
    pub longitude: Degree,
    /// Ecliptic latitude in degrees, [−90°, 90°]
    pub latitude: Degree,
    /// Geocentric distance in AU
    pub distance: f64,
    /// Rate of change of longitude, degrees/day (negative while retrograde)
    pub longitude_speed: DegreesPerDay,
    /// Rate of change of latitude, degrees/day
    pub latitude_speed: DegreesPerDay,
    /// Rate of change of distance, AU/day
    pub distance_speed: f64,
}

impl EclipticPosition {
    /// All six components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.distance.is_finite()
            && self.longitude_speed.is_finite()
            && self.latitude_speed.is_finite()
            && self.distance_speed.is_finite()
    }
}

/// Source of planetary positions and frame angles.
///
/// Only [`body_position`](Ephemeris::body_position) is required; the frame
/// angles default to the built-in IAU formulas of [`ref_system`], so a
/// positions-only source is already a complete implementor. Sources with
/// their own obliquity/sidereal-time machinery (e.g. a full ephemeris
/// library) override the provided methods.
///
/// Implementations must return [`AstrocartaError`], typically
/// [`NonFiniteEphemeris`](AstrocartaError::NonFiniteEphemeris), rather
/// than letting NaN positions leak into the solvers.
pub trait Ephemeris: Send + Sync {
    /// Geocentric ecliptic position of `planet` at `jd`.
    fn body_position(
        &self,
        jd: JulianDay,
        planet: Planet,
    ) -> Result<EclipticPosition, AstrocartaError>;

    /// Mean obliquity of the ecliptic in degrees.
    fn mean_obliquity(&self, jd: JulianDay) -> Degree {
        ref_system::mean_obliquity(jd)
    }

    /// True obliquity (mean + nutation) in degrees.
    fn true_obliquity(&self, jd: JulianDay) -> Degree {
        ref_system::true_obliquity(jd)
    }

    /// Greenwich sidereal time in degrees, [0°, 360°).
    fn sidereal_time_degrees(&self, jd: JulianDay) -> Degree {
        ref_system::apparent_sidereal_time(jd)
    }
}
