//! # Out-of-bounds detection
//!
//! A planet is out of bounds (OOB) when the magnitude of its declination
//! exceeds the obliquity of the ecliptic, i.e. it stands further north or
//! south than the Sun can ever reach. Detection is a pure comparison per
//! planet; the facade supplies the epoch's true obliquity (or the J2000
//! constant when the approximate-obliquity flag is set).

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Planet, PlanetMap};

/// Out-of-bounds state of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OobStatus {
    /// |declination| exceeds the obliquity
    pub out_of_bounds: bool,
    /// Excess over the obliquity limit, degrees; 0 when in bounds
    pub degrees_beyond: Degree,
    /// +1 north of the limit, −1 south, 0 when in bounds
    pub direction: i8,
}

/// Compare one declination against the obliquity limit.
///
/// Arguments
/// ---------
/// * `declination`: declination of the body, degrees.
/// * `obliquity`: obliquity of the ecliptic at the epoch, degrees.
///
/// Return
/// ------
/// * The OOB state; `degrees_beyond` is strictly positive iff
///   `out_of_bounds` is set.
pub fn oob_status(declination: Degree, obliquity: Degree) -> OobStatus {
    let excess = declination.abs() - obliquity;
    if excess > 0.0 {
        OobStatus {
            out_of_bounds: true,
            degrees_beyond: excess,
            direction: if declination > 0.0 { 1 } else { -1 },
        }
    } else {
        OobStatus {
            out_of_bounds: false,
            degrees_beyond: 0.0,
            direction: 0,
        }
    }
}

/// OOB state for every planet in a declination map.
pub fn oob_report(declinations: &PlanetMap<Degree>, obliquity: Degree) -> PlanetMap<OobStatus> {
    let mut map = PlanetMap::default();
    for planet in Planet::ALL {
        map.insert(planet, oob_status(declinations[&planet], obliquity));
    }
    map
}

#[cfg(test)]
mod oob_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_within_bounds() {
        let status = oob_status(20.0, 23.44);
        assert!(!status.out_of_bounds);
        assert_eq!(status.degrees_beyond, 0.0);
        assert_eq!(status.direction, 0);
    }

    #[test]
    fn test_north_excess() {
        let status = oob_status(25.0, 23.44);
        assert!(status.out_of_bounds);
        assert_abs_diff_eq!(status.degrees_beyond, 1.56, epsilon = 1e-12);
        assert_eq!(status.direction, 1);
    }

    #[test]
    fn test_south_excess() {
        let status = oob_status(-28.3, 23.44);
        assert!(status.out_of_bounds);
        assert_abs_diff_eq!(status.degrees_beyond, 4.86, epsilon = 1e-12);
        assert_eq!(status.direction, -1);
    }

    #[test]
    fn test_exactly_at_limit_is_in_bounds() {
        let status = oob_status(23.44, 23.44);
        assert!(!status.out_of_bounds);
        assert_eq!(status.direction, 0);
    }

    #[test]
    fn test_report_covers_all_planets() {
        let mut declinations = PlanetMap::default();
        for (i, planet) in Planet::ALL.into_iter().enumerate() {
            declinations.insert(planet, i as f64 * 3.0 - 10.0);
        }
        let report = oob_report(&declinations, 23.44);
        assert_eq!(report.len(), Planet::ALL.len());
        // Highest entry (+17°) stays in bounds, all others too
        assert!(report.values().all(|s| !s.out_of_bounds));
    }
}
