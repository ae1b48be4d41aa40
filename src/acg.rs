//! # ACG line solver
//!
//! Computes astrocartography lines: for each planet, the curves on Earth's
//! surface where the body is exactly rising (ASC), setting (DSC),
//! culminating (MC) or anti-culminating (IC) at the chart instant.
//!
//! MC and IC lines follow the standard ACG convention and are strictly
//! vertical meridians, `longitude = RA − GMST` (+180° for IC). ASC and DSC
//! curves are sampled per latitude step: the rise/set hour angle comes from
//! the semi-diurnal arc, and latitudes where the body never crosses the
//! horizon are skipped. A line with no valid latitude at all is flagged
//! `is_circumpolar` so consumers can skip rendering it.
//!
//! Point sequences are ordered by latitude. Rendering across the date
//! boundary is a consumer concern: [`split_at_dateline`] breaks a sequence
//! into sub-segments wherever consecutive longitudes differ by more than
//! 180°.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::astro_math::normalize_degrees_symmetric;
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, Planet};
use crate::params::CartaParams;
use crate::positions::ChartPositions;
use crate::sda::semi_diurnal_arc;
use crate::transforms::EquatorialCoord;

/// The four angular line types of an ACG map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcgAngle {
    /// Culminating (upper meridian transit)
    Mc,
    /// Anti-culminating (lower meridian transit)
    Ic,
    /// Rising (eastern horizon crossing)
    Asc,
    /// Setting (western horizon crossing)
    Dsc,
}

impl AcgAngle {
    /// Canonical rendering order.
    pub const ALL: [AcgAngle; 4] = [AcgAngle::Mc, AcgAngle::Ic, AcgAngle::Asc, AcgAngle::Dsc];
}

impl fmt::Display for AcgAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcgAngle::Mc => "MC",
            AcgAngle::Ic => "IC",
            AcgAngle::Asc => "ASC",
            AcgAngle::Dsc => "DSC",
        };
        write!(f, "{name}")
    }
}

/// One sampled point of an ACG curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Geographic latitude, degrees
    pub latitude: Degree,
    /// Geographic longitude, degrees (−180°, 180°]
    pub longitude: Degree,
}

/// One planet/angle curve of the ACG map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcgLine {
    pub planet: Planet,
    pub angle: AcgAngle,
    /// No sampled latitude produced a valid point (ASC/DSC only)
    pub is_circumpolar: bool,
    /// Sampled points ordered by latitude ascending
    pub points: Vec<GeoPoint>,
}

impl AcgLine {
    /// Dateline-safe sub-segments of this line, see [`split_at_dateline`].
    pub fn segments(&self) -> Vec<Vec<GeoPoint>> {
        split_at_dateline(&self.points)
    }
}

/// Split a point sequence wherever consecutive longitudes jump by more
/// than 180°, so a renderer never draws a spurious stroke across the date
/// boundary. Point order within each segment is preserved.
pub fn split_at_dateline(points: &[GeoPoint]) -> Vec<Vec<GeoPoint>> {
    let mut segments = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();
    for point in points {
        if let Some(last) = current.last() {
            if (point.longitude - last.longitude).abs() > 180.0 {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(*point);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Latitude grid of the ACG sampling, −clamp to +clamp inclusive.
fn latitude_samples(params: &CartaParams) -> Vec<Degree> {
    let max = params.acg_latitude_max;
    let step = params.acg_latitude_step;
    let count = (2.0 * max / step).round() as usize;
    (0..=count).map(|i| (-max + i as f64 * step).min(max)).collect()
}

/// A vertical meridian line at constant longitude, sampled down the
/// latitude range so it renders like the other curves.
fn meridian_line(
    planet: Planet,
    angle: AcgAngle,
    longitude: Degree,
    params: &CartaParams,
) -> AcgLine {
    let points = latitude_samples(params)
        .into_iter()
        .map(|latitude| GeoPoint {
            latitude,
            longitude,
        })
        .collect();
    AcgLine {
        planet,
        angle,
        is_circumpolar: false,
        points,
    }
}

/// A horizon-crossing curve (ASC when `rising`, DSC otherwise).
///
/// Per sampled latitude the rise/set hour angle is `∓SDA`; the event
/// longitude follows from `LST = RA + H` and `LST = GMST + longitude`,
/// i.e. `longitude = RA ∓ SDA − GMST`. Circumpolar latitudes contribute
/// no point.
fn horizon_line(
    planet: Planet,
    rising: bool,
    coord: &EquatorialCoord,
    gmst: Degree,
    params: &CartaParams,
) -> Result<AcgLine, AstrocartaError> {
    let mut points = Vec::new();
    for latitude in latitude_samples(params) {
        let arc = semi_diurnal_arc(latitude, coord.declination)?;
        let hour_angle = if rising {
            arc.rise_hour_angle()
        } else {
            arc.set_hour_angle()
        };
        if let Some(h) = hour_angle {
            points.push(GeoPoint {
                latitude,
                longitude: normalize_degrees_symmetric(coord.right_ascension + h - gmst),
            });
        }
    }

    Ok(AcgLine {
        planet,
        angle: if rising { AcgAngle::Asc } else { AcgAngle::Dsc },
        is_circumpolar: points.is_empty(),
        points,
    })
}

/// The four lines of one planet, in [`AcgAngle::ALL`] order.
fn planet_lines(
    positions: &ChartPositions,
    planet: Planet,
    params: &CartaParams,
) -> Result<Vec<AcgLine>, AstrocartaError> {
    let coord = positions.equatorial(planet);
    let gmst = positions.sidereal_time;

    let mc_longitude = normalize_degrees_symmetric(coord.right_ascension - gmst);
    let ic_longitude = normalize_degrees_symmetric(coord.right_ascension - gmst + 180.0);

    Ok(vec![
        meridian_line(planet, AcgAngle::Mc, mc_longitude, params),
        meridian_line(planet, AcgAngle::Ic, ic_longitude, params),
        horizon_line(planet, true, &coord, gmst, params)?,
        horizon_line(planet, false, &coord, gmst, params)?,
    ])
}

/// All ACG lines of a chart: 4 per planet, planets in [`Planet::ALL`]
/// order, angles in [`AcgAngle::ALL`] order within each planet.
///
/// Planets are solved in parallel; the output order is deterministic
/// regardless of scheduling.
pub fn acg_lines(
    positions: &ChartPositions,
    params: &CartaParams,
) -> Result<Vec<AcgLine>, AstrocartaError> {
    let per_planet: Result<Vec<Vec<AcgLine>>, AstrocartaError> = Planet::ALL
        .par_iter()
        .map(|&planet| planet_lines(positions, planet, params))
        .collect();

    Ok(per_planet?.into_iter().flatten().collect())
}
