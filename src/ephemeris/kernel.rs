//! # Table-backed ephemeris kernel
//!
//! [`ChartKernel`] serves positions from a per-planet table of epoch
//! samples, linearly interpolated between the bracketing rows (wrap-aware
//! in longitude). Real ephemerides are interpolation tables at heart; this
//! one trades their Chebyshev records for straight lines, which is exact
//! enough for the day-scale sampling the chart pipeline performs around a
//! single epoch.
//!
//! Tables load from a CSV **chart snapshot** with the header
//!
//! ```text
//! jd,planet,longitude,latitude,distance,longitude_speed,latitude_speed,distance_speed
//! ```
//!
//! one row per planet per sampled epoch. A snapshot must cover all ten
//! planets and contain only finite values; violations are rejected at load
//! time so the solvers never see bad data.

use serde::{Deserialize, Serialize};

use crate::astrocarta_errors::AstrocartaError;
use crate::astro_math::{normalize_degrees, normalize_degrees_symmetric};
use crate::constants::{JulianDay, Planet, PlanetMap};
use crate::ephemeris::{Ephemeris, EclipticPosition};

/// One CSV row of a chart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRow {
    jd: JulianDay,
    planet: Planet,
    longitude: f64,
    latitude: f64,
    distance: f64,
    longitude_speed: f64,
    latitude_speed: f64,
    distance_speed: f64,
}

impl SnapshotRow {
    fn position(&self) -> EclipticPosition {
        EclipticPosition {
            longitude: self.longitude,
            latitude: self.latitude,
            distance: self.distance,
            longitude_speed: self.longitude_speed,
            latitude_speed: self.latitude_speed,
            distance_speed: self.distance_speed,
        }
    }
}

/// Interpolating position table implementing [`Ephemeris`].
#[derive(Debug, Clone)]
pub struct ChartKernel {
    /// Per-planet samples sorted by epoch; non-empty for every planet.
    samples: PlanetMap<Vec<(JulianDay, EclipticPosition)>>,
}

impl ChartKernel {
    /// Build a kernel from explicit `(jd, planet, position)` samples.
    ///
    /// Return
    /// ------
    /// * `Err(SnapshotFormat)` if any planet has no sample or any value is
    ///   non-finite.
    pub fn from_samples<I>(samples: I) -> Result<Self, AstrocartaError>
    where
        I: IntoIterator<Item = (JulianDay, Planet, EclipticPosition)>,
    {
        let mut table: PlanetMap<Vec<(JulianDay, EclipticPosition)>> = PlanetMap::default();

        for (jd, planet, position) in samples {
            if !jd.is_finite() || !position.is_finite() {
                return Err(AstrocartaError::SnapshotFormat(format!(
                    "non-finite sample for {planet} at JD {jd}"
                )));
            }
            table.entry(planet).or_default().push((jd, position));
        }

        for planet in Planet::ALL {
            match table.get_mut(&planet) {
                Some(entries) => {
                    entries.sort_by(|a, b| a.0.total_cmp(&b.0));
                }
                None => {
                    return Err(AstrocartaError::SnapshotFormat(format!(
                        "snapshot has no samples for {planet}"
                    )))
                }
            }
        }

        Ok(ChartKernel { samples: table })
    }

    /// Load a kernel from a CSV chart snapshot.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, AstrocartaError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut samples = Vec::new();
        for row in csv_reader.deserialize() {
            let row: SnapshotRow = row?;
            samples.push((row.jd, row.planet, row.position()));
        }
        Self::from_samples(samples)
    }

    /// Load a kernel from a CSV chart snapshot on disk.
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, AstrocartaError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Write the table back out as a CSV chart snapshot.
    ///
    /// Rows are emitted planet-major in canonical order, epochs ascending,
    /// so two kernels with the same samples serialize identically.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), AstrocartaError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for planet in Planet::ALL {
            for (jd, position) in &self.samples[&planet] {
                csv_writer.serialize(SnapshotRow {
                    jd: *jd,
                    planet,
                    longitude: position.longitude,
                    latitude: position.latitude,
                    distance: position.distance,
                    longitude_speed: position.longitude_speed,
                    latitude_speed: position.latitude_speed,
                    distance_speed: position.distance_speed,
                })?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Epoch range covered for a planet.
    pub fn coverage(&self, planet: Planet) -> (JulianDay, JulianDay) {
        let entries = &self.samples[&planet];
        (entries[0].0, entries[entries.len() - 1].0)
    }
}

/// Linear interpolation between two samples, wrap-aware in longitude.
fn interpolate(
    t0: JulianDay,
    p0: &EclipticPosition,
    t1: JulianDay,
    p1: &EclipticPosition,
    jd: JulianDay,
) -> EclipticPosition {
    if t1 == t0 {
        return *p0;
    }
    let u = (jd - t0) / (t1 - t0);

    // The shorter way around the circle, so 359° → 1° moves through 0°
    let d_lon = normalize_degrees_symmetric(p1.longitude - p0.longitude);

    EclipticPosition {
        longitude: normalize_degrees(p0.longitude + u * d_lon),
        latitude: p0.latitude + u * (p1.latitude - p0.latitude),
        distance: p0.distance + u * (p1.distance - p0.distance),
        longitude_speed: p0.longitude_speed + u * (p1.longitude_speed - p0.longitude_speed),
        latitude_speed: p0.latitude_speed + u * (p1.latitude_speed - p0.latitude_speed),
        distance_speed: p0.distance_speed + u * (p1.distance_speed - p0.distance_speed),
    }
}

impl Ephemeris for ChartKernel {
    fn body_position(
        &self,
        jd: JulianDay,
        planet: Planet,
    ) -> Result<EclipticPosition, AstrocartaError> {
        if !jd.is_finite() {
            return Err(AstrocartaError::InvalidInput(format!(
                "jd must be finite, got {jd}"
            )));
        }

        let entries = &self.samples[&planet];
        let (first, last) = (entries[0].0, entries[entries.len() - 1].0);
        if jd < first || jd > last {
            return Err(AstrocartaError::Ephemeris(format!(
                "JD {jd} outside snapshot coverage [{first}, {last}] for {planet}"
            )));
        }

        let idx = entries.partition_point(|(t, _)| *t <= jd);
        if idx == 0 {
            return Ok(entries[0].1);
        }
        let (t0, p0) = &entries[idx - 1];
        if *t0 == jd || idx == entries.len() {
            return Ok(*p0);
        }
        let (t1, p1) = &entries[idx];

        Ok(interpolate(*t0, p0, *t1, p1, jd))
    }
}
