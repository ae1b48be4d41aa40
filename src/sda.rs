//! # Semi-diurnal arc
//!
//! For an observer latitude φ and a body declination δ, the semi-diurnal
//! arc (SDA) is the hour angle at which the body crosses the horizon:
//!
//! ```text
//! cos(SDA) = −tan φ · tan δ
//! ```
//!
//! When `|tan φ · tan δ| ≥ 1` the body never crosses the horizon at that
//! latitude: circumpolar (never sets) or permanently below (never rises).
//! Those outcomes are **sentinel flags**, not errors; the paran and ACG
//! solvers evaluate thousands of latitudes per chart and branch on the
//! flags in their hot loops.

use serde::{Deserialize, Serialize};

use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, Hours, DEGREES_PER_HOUR, RADEG};

/// Rise/set geometry of a body at one latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiurnalArc {
    /// Semi-diurnal arc in degrees; 180 when the body never sets, 0 when
    /// it never rises.
    pub sda: Degree,
    /// Body stays below the horizon all day
    pub never_rises: bool,
    /// Body stays above the horizon all day
    pub never_sets: bool,
}

impl DiurnalArc {
    /// True when the body never crosses the horizon at this latitude.
    pub fn is_circumpolar(&self) -> bool {
        self.never_rises || self.never_sets
    }

    /// Hour angle of rising (−SDA), `None` when no rising occurs.
    pub fn rise_hour_angle(&self) -> Option<Degree> {
        (!self.is_circumpolar()).then_some(-self.sda)
    }

    /// Hour angle of setting (+SDA), `None` when no setting occurs.
    pub fn set_hour_angle(&self) -> Option<Degree> {
        (!self.is_circumpolar()).then_some(self.sda)
    }
}

/// Latitude thresholds beyond which a body of declination δ is circumpolar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircumpolarLatitude {
    /// Northern threshold, +(90 − |δ|)
    pub north: Degree,
    /// Southern threshold, −(90 − |δ|)
    pub south: Degree,
    /// False only for δ = 0, which skims the horizon at the poles instead
    /// of ever being circumpolar
    pub can_be_circumpolar: bool,
}

/// Length of the arc a body spends above (or below) the horizon.
///
/// The circumpolar cases are distinct variants rather than magic numeric
/// values; callers must branch on the variant, not assume a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcHours {
    Hours(Hours),
    AlwaysUp,
    AlwaysDown,
}

impl ArcHours {
    /// Numeric arc length, `None` for the circumpolar sentinels.
    pub fn as_hours(&self) -> Option<Hours> {
        match self {
            ArcHours::Hours(h) => Some(*h),
            _ => None,
        }
    }
}

fn validate_lat_dec(latitude: Degree, declination: Degree) -> Result<(), AstrocartaError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AstrocartaError::InvalidInput(format!(
            "latitude must be in [-90, 90], got {latitude}"
        )));
    }
    if !declination.is_finite() || !(-90.0..=90.0).contains(&declination) {
        return Err(AstrocartaError::InvalidInput(format!(
            "declination must be in [-90, 90], got {declination}"
        )));
    }
    Ok(())
}

/// Semi-diurnal arc of a body at an observer latitude.
///
/// Arguments
/// ---------
/// * `latitude`: observer latitude φ in degrees, [−90, 90].
/// * `declination`: body declination δ in degrees, [−90, 90].
///
/// Return
/// ------
/// * A [`DiurnalArc`]; circumpolar outcomes are flags, never errors.
///
/// Edge cases
/// ----------
/// * `tan φ · tan δ ≥ 1` → never sets (`sda = 180`);
///   `tan φ · tan δ ≤ −1` → never rises (`sda = 0`). The boundary values
///   (horizon-grazing bodies) are folded into the circumpolar outcomes.
/// * At the poles the hour angle of a horizon crossing is undefined. A body
///   with δ of the same sign as φ never sets there, opposite sign never
///   rises, and δ = 0 is treated as never-rises by convention.
pub fn semi_diurnal_arc(
    latitude: Degree,
    declination: Degree,
) -> Result<DiurnalArc, AstrocartaError> {
    validate_lat_dec(latitude, declination)?;

    if latitude.abs() == 90.0 {
        let above = declination * latitude.signum() > 0.0;
        return Ok(if above {
            DiurnalArc {
                sda: 180.0,
                never_rises: false,
                never_sets: true,
            }
        } else {
            DiurnalArc {
                sda: 0.0,
                never_rises: true,
                never_sets: false,
            }
        });
    }

    let product = (latitude * RADEG).tan() * (declination * RADEG).tan();

    if product >= 1.0 {
        return Ok(DiurnalArc {
            sda: 180.0,
            never_rises: false,
            never_sets: true,
        });
    }
    if product <= -1.0 {
        return Ok(DiurnalArc {
            sda: 0.0,
            never_rises: true,
            never_sets: false,
        });
    }

    Ok(DiurnalArc {
        sda: (-product).acos() / RADEG,
        never_rises: false,
        never_sets: false,
    })
}

/// Latitude thresholds above/below which a body of declination δ is
/// circumpolar: ±(90 − |δ|).
pub fn circumpolar_latitude(declination: Degree) -> Result<CircumpolarLatitude, AstrocartaError> {
    validate_lat_dec(0.0, declination)?;

    let threshold = 90.0 - declination.abs();
    Ok(CircumpolarLatitude {
        north: threshold,
        south: -threshold,
        can_be_circumpolar: declination != 0.0,
    })
}

/// Hours the body spends above the horizon: SDA × 2 / 15.
pub fn diurnal_arc_hours(latitude: Degree, declination: Degree) -> Result<ArcHours, AstrocartaError> {
    let arc = semi_diurnal_arc(latitude, declination)?;
    Ok(if arc.never_sets {
        ArcHours::AlwaysUp
    } else if arc.never_rises {
        ArcHours::AlwaysDown
    } else {
        ArcHours::Hours(arc.sda * 2.0 / DEGREES_PER_HOUR)
    })
}

/// Hours the body spends below the horizon; complements
/// [`diurnal_arc_hours`] to 24, with the sentinels swapped.
pub fn nocturnal_arc_hours(
    latitude: Degree,
    declination: Degree,
) -> Result<ArcHours, AstrocartaError> {
    Ok(match diurnal_arc_hours(latitude, declination)? {
        ArcHours::Hours(h) => ArcHours::Hours(24.0 - h),
        ArcHours::AlwaysUp => ArcHours::AlwaysDown,
        ArcHours::AlwaysDown => ArcHours::AlwaysUp,
    })
}

/// Hour angle at which the body reaches a given altitude, in [0°, 180°].
///
/// Solves `cos H = (sin alt − sin δ sin φ) / (cos δ cos φ)`.
///
/// Return
/// ------
/// * `Ok(None)` when the altitude is unreachable at this latitude
///   (right-hand side outside [−1, 1]) or the geometry degenerates
///   (poles, |δ| = 90).
pub fn hour_angle_at_altitude(
    latitude: Degree,
    declination: Degree,
    altitude: Degree,
) -> Result<Option<Degree>, AstrocartaError> {
    validate_lat_dec(latitude, declination)?;
    if !altitude.is_finite() || !(-90.0..=90.0).contains(&altitude) {
        return Err(AstrocartaError::InvalidInput(format!(
            "altitude must be in [-90, 90], got {altitude}"
        )));
    }

    let phi = latitude * RADEG;
    let delta = declination * RADEG;
    let alt = altitude * RADEG;

    let denominator = delta.cos() * phi.cos();
    if denominator == 0.0 {
        return Ok(None);
    }

    let cos_h = (alt.sin() - delta.sin() * phi.sin()) / denominator;
    if !(-1.0..=1.0).contains(&cos_h) {
        return Ok(None);
    }

    Ok(Some(cos_h.acos() / RADEG))
}
