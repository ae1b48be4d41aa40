//! # Astrocarta: the chart computation façade
//!
//! This module defines the [`Astrocarta`](crate::astrocarta::Astrocarta) struct, the central façade that wires together:
//!
//! 1. **Ephemeris access** — any [`Ephemeris`](crate::ephemeris::Ephemeris) implementation,
//!    e.g. the CSV-snapshot [`ChartKernel`](crate::ephemeris::kernel::ChartKernel).
//! 2. **Per-planet chart state** — positions, declinations, sidereal time
//!    ([`ChartPositions`](crate::positions::ChartPositions)).
//! 3. **Solvers** — ACG lines, paran catalog, zenith bands, OOB detection,
//!    speed/station engine.
//! 4. **Scoring** — latitude optimization, city ranking and world-grid
//!    scoring over the computed geometry.
//!
//! The design is *stateless per request*: constructing the façade performs all
//! initialization, and every epoch query recomputes the chart state from the
//! immutable ephemeris handle. Two identical calls always yield identical
//! results; there is no interior mutability and no cross-request cache.
//!
//! ## Key responsibilities
//!
//! - Single entry point for the **full chart pipeline** through
//!   [`full_chart`](crate::astrocarta::Astrocarta::full_chart)
//! - One canonical **paran path**: every public entry delegates to
//!   [`paran_catalog`](crate::paran::paran_catalog), with optional cooperative
//!   cancellation via [`CancelToken`](crate::paran::CancelToken)
//! - Obliquity policy: the epoch's true obliquity from the adapter, or the
//!   fixed J2000 value when
//!   [`approximate_obliquity`](crate::params::CartaParams::approximate_obliquity)
//!   is set
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use astrocarta::astrocarta::Astrocarta;
//! use astrocarta::ephemeris::kernel::ChartKernel;
//!
//! # fn main() -> Result<(), astrocarta::astrocarta_errors::AstrocartaError> {
//! // Load a position snapshot and build the engine
//! let kernel = ChartKernel::from_csv_path("snapshot.csv".as_ref())?;
//! let engine = Astrocarta::new(kernel);
//!
//! // Compute the full geometry for an epoch
//! let chart = engine.full_chart(2451545.0)?;
//! println!(
//!     "{} ACG lines, {} parans",
//!     chart.acg_lines.len(),
//!     chart.parans.points.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## See also
//! ------------
//! * [`Ephemeris`](crate::ephemeris::Ephemeris) – Position source boundary.
//! * [`CartaParams`](crate::params::CartaParams) – All pipeline tunables.
//! * [`paran_catalog`](crate::paran::paran_catalog) – The 45×16 root search.
//! * [`rank_cities`](crate::scoring::rank_cities) – Geometry-driven ranking.

use serde::{Deserialize, Serialize};

use crate::acg::{self, AcgLine};
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{JulianDay, Planet, PlanetMap};
use crate::ephemeris::Ephemeris;
use crate::oob::{self, OobStatus};
use crate::params::CartaParams;
use crate::paran::{self, CancelToken, ParanCatalog};
use crate::positions::{self, ChartPositions, PlanetSpeed, Station};
use crate::scoring::{self, City, CityScore, GridCell, LatitudeScore, PlanetWeight};
use crate::zenith::{self, ZenithLine, ZenithOverlap};

/// Everything the pipeline derives for one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub positions: ChartPositions,
    pub speeds: PlanetMap<PlanetSpeed>,
    pub oob: PlanetMap<OobStatus>,
    pub acg_lines: Vec<AcgLine>,
    pub zenith_lines: Vec<ZenithLine>,
    pub zenith_overlaps: Vec<ZenithOverlap>,
    pub parans: ParanCatalog,
}

/// Relocation-geometry engine over one ephemeris source.
#[derive(Debug, Clone)]
pub struct Astrocarta<E: Ephemeris> {
    ephemeris: E,
    params: CartaParams,
}

impl<E: Ephemeris> Astrocarta<E> {
    /// Build an engine with default parameters.
    pub fn new(ephemeris: E) -> Self {
        Self {
            ephemeris,
            params: CartaParams::default(),
        }
    }

    /// Build an engine with custom parameters.
    pub fn with_params(ephemeris: E, params: CartaParams) -> Self {
        Self { ephemeris, params }
    }

    pub fn params(&self) -> &CartaParams {
        &self.params
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Per-planet chart state at `jd`.
    pub fn chart_positions(&self, jd: JulianDay) -> Result<ChartPositions, AstrocartaError> {
        ChartPositions::compute(&self.ephemeris, jd, &self.params)
    }

    /// Longitude speeds and motion flags at `jd`.
    pub fn planet_speeds(
        &self,
        jd: JulianDay,
    ) -> Result<PlanetMap<PlanetSpeed>, AstrocartaError> {
        positions::planet_speeds(&self.ephemeris, jd, &self.params)
    }

    /// Next station of `planet` at or after `jd_start`; `None` for the
    /// luminaries or when none occurs within the search horizon.
    pub fn find_station(
        &self,
        planet: Planet,
        jd_start: JulianDay,
    ) -> Result<Option<Station>, AstrocartaError> {
        positions::find_station(&self.ephemeris, planet, jd_start, &self.params)
    }

    /// Out-of-bounds state of every planet at `jd`.
    pub fn oob_report(&self, jd: JulianDay) -> Result<PlanetMap<OobStatus>, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        Ok(oob::oob_report(&chart.declinations(), chart.obliquity))
    }

    /// All ACG lines at `jd`.
    pub fn acg_lines(&self, jd: JulianDay) -> Result<Vec<AcgLine>, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        acg::acg_lines(&chart, &self.params)
    }

    /// Zenith bands at `jd`.
    pub fn zenith_lines(&self, jd: JulianDay) -> Result<Vec<ZenithLine>, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        Ok(zenith::zenith_lines(&chart.declinations(), &self.params))
    }

    /// Zenith overlap clusters at `jd`.
    pub fn zenith_overlaps(&self, jd: JulianDay) -> Result<Vec<ZenithOverlap>, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        Ok(zenith::zenith_overlaps(&chart.declinations(), &self.params))
    }

    /// Paran catalog at `jd`.
    pub fn paran_catalog(&self, jd: JulianDay) -> Result<ParanCatalog, AstrocartaError> {
        self.paran_catalog_with_token(jd, &CancelToken::new())
    }

    /// Paran catalog at `jd` with cooperative cancellation.
    pub fn paran_catalog_with_token(
        &self,
        jd: JulianDay,
        token: &CancelToken,
    ) -> Result<ParanCatalog, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        paran::paran_catalog(&chart, &self.params, token)
    }

    /// The full geometry of one epoch: positions, speeds, OOB report, ACG
    /// lines, zenith bands and overlaps, and the paran catalog.
    pub fn full_chart(&self, jd: JulianDay) -> Result<ChartGeometry, AstrocartaError> {
        let positions = self.chart_positions(jd)?;
        let declinations = positions.declinations();

        let speeds = positions::planet_speeds(&self.ephemeris, jd, &self.params)?;
        let oob = oob::oob_report(&declinations, positions.obliquity);
        let acg_lines = acg::acg_lines(&positions, &self.params)?;
        let zenith_lines = zenith::zenith_lines(&declinations, &self.params);
        let zenith_overlaps = zenith::zenith_overlaps(&declinations, &self.params);
        let parans = paran::paran_catalog(&positions, &self.params, &CancelToken::new())?;

        Ok(ChartGeometry {
            positions,
            speeds,
            oob,
            acg_lines,
            zenith_lines,
            zenith_overlaps,
            parans,
        })
    }

    /// Rank candidate cities against the geometry at `jd`.
    pub fn rank_cities(
        &self,
        jd: JulianDay,
        cities: &[City],
        weights: &[PlanetWeight],
    ) -> Result<Vec<CityScore>, AstrocartaError> {
        let positions = self.chart_positions(jd)?;
        let declinations = positions.declinations();
        let lines = acg::acg_lines(&positions, &self.params)?;
        let parans = paran::paran_catalog(&positions, &self.params, &CancelToken::new())?;

        scoring::rank_cities(cities, &declinations, &lines, &parans, weights, &self.params)
    }

    /// Score the world grid against the geometry at `jd`.
    pub fn score_grid(
        &self,
        jd: JulianDay,
        weights: &[PlanetWeight],
    ) -> Result<Vec<GridCell>, AstrocartaError> {
        let positions = self.chart_positions(jd)?;
        let declinations = positions.declinations();
        let lines = acg::acg_lines(&positions, &self.params)?;
        let parans = paran::paran_catalog(&positions, &self.params, &CancelToken::new())?;

        scoring::score_grid(&declinations, &lines, &parans, weights, &self.params)
    }

    /// Top scoring latitudes for the given planet emphasis at `jd`.
    pub fn optimal_latitudes(
        &self,
        jd: JulianDay,
        weights: &[PlanetWeight],
    ) -> Result<Vec<LatitudeScore>, AstrocartaError> {
        let chart = self.chart_positions(jd)?;
        Ok(scoring::optimal_latitudes(
            &chart.declinations(),
            weights,
            &self.params,
        ))
    }
}
