use hifitime::{Epoch, TimeScale};

use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{JulianDay, JD2000, JDTOMJD, JULIAN_CENTURY, MJD};

/// Convert a Gregorian UTC date-time to a Julian Date.
///
/// Thin wrapper over hifitime; the Julian Date is the only time
/// representation used downstream of this function. Birth-time and
/// timezone handling is the caller's concern; inputs here are already
/// UTC.
///
/// Arguments
/// ---------
/// * `year`, `month`, `day`: Gregorian calendar date.
/// * `hour`, `minute`, `second`: UTC time of day.
///
/// Return
/// ------
/// * The Julian Date, or [`AstrocartaError::InvalidDate`] for an invalid
///   calendar combination.
pub fn calendar_to_jd(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> Result<JulianDay, AstrocartaError> {
    let epoch =
        Epoch::maybe_from_gregorian(year, month, day, hour, minute, second, 0, TimeScale::UTC)
            .map_err(|e| AstrocartaError::InvalidDate(e.to_string()))?;
    Ok(epoch.to_jde_utc_days())
}

/// Julian Date → Modified Julian Date.
#[inline]
pub fn jd_to_mjd(jd: JulianDay) -> MJD {
    jd - JDTOMJD
}

/// Modified Julian Date → Julian Date.
#[inline]
pub fn mjd_to_jd(mjd: MJD) -> JulianDay {
    mjd + JDTOMJD
}

/// Julian centuries elapsed since J2000.0.
#[inline]
pub fn julian_centuries(jd: JulianDay) -> f64 {
    (jd - JD2000) / JULIAN_CENTURY
}

#[cfg(test)]
mod time_test {
    use super::*;

    #[test]
    fn test_calendar_to_jd() {
        let jd = calendar_to_jd(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(jd, 2451545.0);

        let jd = calendar_to_jd(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(jd, 2459215.5);
    }

    #[test]
    fn test_calendar_to_jd_rejects_bad_date() {
        assert!(calendar_to_jd(2021, 13, 1, 0, 0, 0).is_err());
        assert!(calendar_to_jd(2021, 2, 30, 0, 0, 0).is_err());
    }

    #[test]
    fn test_jd_mjd_round_trip() {
        let jd = 2459215.5;
        assert_eq!(jd_to_mjd(jd), 59215.0);
        assert_eq!(mjd_to_jd(jd_to_mjd(jd)), jd);
    }

    #[test]
    fn test_julian_centuries() {
        assert_eq!(julian_centuries(JD2000), 0.0);
        assert_eq!(julian_centuries(JD2000 + JULIAN_CENTURY), 1.0);
    }
}
