//! # Chart computation parameters
//!
//! This module defines the [`CartaParams`] configuration struct and its
//! builder, which control latitude sampling for the paran search, ACG line
//! resolution, zenith band widths, the speed/station engine, and the
//! scoring layer.
//!
//! ## Purpose
//!
//! [`CartaParams`] centralizes every tunable used by the chart pipeline.
//! It allows you to:
//!
//! - Tune the paran root search (scan bounds, step, bisection tolerance,
//!   strength threshold),
//! - Control ACG curve sampling (latitude step and clamp),
//! - Set zenith band orbs and the overlap clustering tolerance,
//! - Adjust the numerical speed engine (differentiation step, retrograde
//!   epsilon, station search horizon and precision),
//! - Configure the latitude optimizer, city ranking and world grid (scan
//!   range, step, top-N, Gaussian falloff, proximity orbs, grid cell
//!   size),
//! - Opt into the fixed J2000 obliquity instead of the epoch value.
//!
//! ## Example
//!
//! ```rust
//! use astrocarta::params::CartaParams;
//!
//! let params = CartaParams::builder()
//!     .paran_latitude_step(0.5)
//!     .bisection_tol(1e-5)
//!     .zenith_orb(1.5)
//!     .scoring_top_n(10)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## See also
//!
//! * [`crate::paran::paran_catalog`] – main consumer of the search tunables.
//! * [`crate::scoring`] – consumer of the ranking tunables.
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, DegreesPerDay};

/// Configuration parameters controlling the chart computation pipeline.
///
/// Overview
/// -----------------
/// The pipeline stages consume these groups:
///
/// 1) **Paran search** – the latitude band is scanned at
///    `paran_latitude_step` between `paran_latitude_min` and
///    `paran_latitude_max`; each sign change is refined by bisection down
///    to `bisection_tol` (capped at `bisection_max_iter` iterations), and
///    crossings weaker than `paran_strength_threshold` are dropped.
///
/// 2) **ACG sampling** – horizon curves are sampled every
///    `acg_latitude_step` degrees of latitude, clamped to
///    ±`acg_latitude_max`.
///
/// 3) **Zenith bands** – each band spans declination ± `zenith_orb`;
///    overlap clustering merges planets whose declinations sit within
///    `zenith_overlap_tolerance` of each other.
///
/// 4) **Speed & stations** – longitude speeds use a central difference
///    with half-step `speed_step_days`; retrogradation requires speed
///    below −`retrograde_epsilon`; station search forward-steps up to
///    `station_search_days` and refines to `station_time_tol_days`.
///
/// 5) **Scoring / ranking** – the latitude optimizer scans
///    [`scoring_latitude_min`, `scoring_latitude_max`] at
///    `scoring_latitude_step`, keeps `scoring_top_n` results, and scores
///    with a Gaussian of width `gaussian_sigma`; city ranking uses
///    `zenith_orb`, `line_orb` and `paran_orb` as proximity scales, and
///    the scored world grid steps both axes by `grid_step`.
///
/// Defaults
/// -----------------
/// ```rust
/// use astrocarta::params::CartaParams;
/// let params = CartaParams::default();
/// ```
///
/// Default values:
///
/// * `paran_latitude_min`: −89.0°, `paran_latitude_max`: 89.0°
/// * `paran_latitude_step`: 1.0°
/// * `bisection_tol`: 1.0e-4°, `bisection_max_iter`: 50
/// * `paran_strength_threshold`: 0.5
/// * `acg_latitude_step`: 0.5°, `acg_latitude_max`: 89.0°
/// * `zenith_orb`: 1.0°, `zenith_overlap_tolerance`: 1.0°
/// * `speed_step_days`: 0.5 d, `retrograde_epsilon`: 1.0e-4 °/d
/// * `station_search_days`: 800 d, `station_time_tol_days`: 1.0e-3 d
/// * `scoring_latitude_min`: −70.0°, `scoring_latitude_max`: 70.0°
/// * `scoring_latitude_step`: 0.5°, `scoring_top_n`: 5
/// * `gaussian_sigma`: 3.0°, `line_orb`: 5.0°, `paran_orb`: 1.0°
/// * `grid_step`: 5.0°
/// * `approximate_obliquity`: false
///
/// Notes & Validation
/// -----------------
/// * −90° < `paran_latitude_min` < `paran_latitude_max` < 90°; the scan
///   never touches the poles, where hour angles degenerate.
/// * `paran_strength_threshold` ∈ [0, 1].
/// * All steps, tolerances and orbs must be strictly positive;
///   `retrograde_epsilon` and `zenith_overlap_tolerance` may be zero.
/// * `bisection_max_iter ≥ 1`, `scoring_top_n ≥ 1`.
///
/// See also
/// -----------------
/// * [`CartaParamsBuilder`] – fluent construction with validation.
/// * [`crate::astrocarta::Astrocarta`] – carries one [`CartaParams`] per
///   engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CartaParams {
    // --- Paran search ---
    /// Lower bound of the paran latitude scan, degrees.
    pub paran_latitude_min: Degree,
    /// Upper bound of the paran latitude scan, degrees.
    pub paran_latitude_max: Degree,
    /// Coarse scan step for bracketing sign changes, degrees.
    pub paran_latitude_step: Degree,
    /// Bisection convergence tolerance on latitude, degrees.
    pub bisection_tol: Degree,
    /// Iteration cap shared by the latitude and station bisections.
    pub bisection_max_iter: usize,
    /// Minimum retained crossing strength, in [0, 1].
    pub paran_strength_threshold: f64,

    // --- ACG sampling ---
    /// Latitude sampling step for horizon (ASC/DSC) curves, degrees.
    pub acg_latitude_step: Degree,
    /// Horizon curves are clamped to ±this latitude, degrees.
    pub acg_latitude_max: Degree,

    // --- Zenith bands ---
    /// Half-width of a zenith band around the declination, degrees.
    pub zenith_orb: Degree,
    /// Declination clustering tolerance for overlap detection, degrees.
    pub zenith_overlap_tolerance: Degree,

    // --- Speed & stations ---
    /// Central-difference half-step for longitude speeds, days.
    pub speed_step_days: f64,
    /// Speeds above −ε are not flagged retrograde, degrees/day.
    pub retrograde_epsilon: DegreesPerDay,
    /// Forward search horizon for the next station, days.
    pub station_search_days: f64,
    /// Station time refinement tolerance, days.
    pub station_time_tol_days: f64,

    // --- Scoring / ranking ---
    /// Lower bound of the latitude optimizer scan, degrees.
    pub scoring_latitude_min: Degree,
    /// Upper bound of the latitude optimizer scan, degrees.
    pub scoring_latitude_max: Degree,
    /// Optimizer scan step, degrees.
    pub scoring_latitude_step: Degree,
    /// Number of top latitudes retained by the optimizer.
    pub scoring_top_n: usize,
    /// Gaussian falloff width for declination alignment, degrees.
    pub gaussian_sigma: Degree,
    /// Proximity scale for ACG lines in city ranking, degrees.
    pub line_orb: Degree,
    /// Proximity scale for paran latitudes in city ranking, degrees.
    pub paran_orb: Degree,
    /// Cell size of the scored world grid, both axes, degrees.
    pub grid_step: Degree,

    // --- Frames ---
    /// Use the fixed J2000 obliquity instead of the epoch value.
    pub approximate_obliquity: bool,
}

impl CartaParams {
    /// Construct a new [`CartaParams`] with the documented default values.
    ///
    /// This is equivalent to calling [`CartaParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`CartaParamsBuilder`] to configure custom parameters.
    ///
    /// This is a fluent builder API for [`CartaParams`], allowing you to
    /// override the defaults step by step before handing the result to
    /// [`Astrocarta`](crate::astrocarta::Astrocarta).
    ///
    /// # Example
    ///
    /// ```rust
    /// use astrocarta::params::CartaParams;
    ///
    /// let params = CartaParams::builder()
    ///     .paran_latitude_step(0.25)
    ///     .paran_strength_threshold(0.6)
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> CartaParamsBuilder {
        CartaParamsBuilder::new()
    }
}

impl Default for CartaParams {
    fn default() -> Self {
        CartaParams {
            // Paran search
            paran_latitude_min: -89.0,
            paran_latitude_max: 89.0,
            paran_latitude_step: 1.0,
            bisection_tol: 1.0e-4,
            bisection_max_iter: 50,
            paran_strength_threshold: 0.5,

            // ACG sampling
            acg_latitude_step: 0.5,
            acg_latitude_max: 89.0,

            // Zenith bands
            zenith_orb: 1.0,
            zenith_overlap_tolerance: 1.0,

            // Speed & stations
            speed_step_days: 0.5,
            retrograde_epsilon: 1.0e-4,
            station_search_days: 800.0,
            station_time_tol_days: 1.0e-3,

            // Scoring / ranking
            scoring_latitude_min: -70.0,
            scoring_latitude_max: 70.0,
            scoring_latitude_step: 0.5,
            scoring_top_n: 5,
            gaussian_sigma: 3.0,
            line_orb: 5.0,
            paran_orb: 1.0,
            grid_step: 5.0,

            // Frames
            approximate_obliquity: false,
        }
    }
}

/// Builder for [`CartaParams`], with validation.
#[derive(Debug, Clone)]
pub struct CartaParamsBuilder {
    params: CartaParams,
}

impl Default for CartaParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CartaParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: CartaParams::default(),
        }
    }

    // --- Paran search ---
    pub fn paran_latitude_min(mut self, v: Degree) -> Self {
        self.params.paran_latitude_min = v;
        self
    }
    pub fn paran_latitude_max(mut self, v: Degree) -> Self {
        self.params.paran_latitude_max = v;
        self
    }
    pub fn paran_latitude_step(mut self, v: Degree) -> Self {
        self.params.paran_latitude_step = v;
        self
    }
    pub fn bisection_tol(mut self, v: Degree) -> Self {
        self.params.bisection_tol = v;
        self
    }
    pub fn bisection_max_iter(mut self, v: usize) -> Self {
        self.params.bisection_max_iter = v;
        self
    }
    pub fn paran_strength_threshold(mut self, v: f64) -> Self {
        self.params.paran_strength_threshold = v;
        self
    }

    // --- ACG sampling ---
    pub fn acg_latitude_step(mut self, v: Degree) -> Self {
        self.params.acg_latitude_step = v;
        self
    }
    pub fn acg_latitude_max(mut self, v: Degree) -> Self {
        self.params.acg_latitude_max = v;
        self
    }

    // --- Zenith bands ---
    pub fn zenith_orb(mut self, v: Degree) -> Self {
        self.params.zenith_orb = v;
        self
    }
    pub fn zenith_overlap_tolerance(mut self, v: Degree) -> Self {
        self.params.zenith_overlap_tolerance = v;
        self
    }

    // --- Speed & stations ---
    pub fn speed_step_days(mut self, v: f64) -> Self {
        self.params.speed_step_days = v;
        self
    }
    pub fn retrograde_epsilon(mut self, v: DegreesPerDay) -> Self {
        self.params.retrograde_epsilon = v;
        self
    }
    pub fn station_search_days(mut self, v: f64) -> Self {
        self.params.station_search_days = v;
        self
    }
    pub fn station_time_tol_days(mut self, v: f64) -> Self {
        self.params.station_time_tol_days = v;
        self
    }

    // --- Scoring / ranking ---
    pub fn scoring_latitude_min(mut self, v: Degree) -> Self {
        self.params.scoring_latitude_min = v;
        self
    }
    pub fn scoring_latitude_max(mut self, v: Degree) -> Self {
        self.params.scoring_latitude_max = v;
        self
    }
    pub fn scoring_latitude_step(mut self, v: Degree) -> Self {
        self.params.scoring_latitude_step = v;
        self
    }
    pub fn scoring_top_n(mut self, v: usize) -> Self {
        self.params.scoring_top_n = v;
        self
    }
    pub fn gaussian_sigma(mut self, v: Degree) -> Self {
        self.params.gaussian_sigma = v;
        self
    }
    pub fn line_orb(mut self, v: Degree) -> Self {
        self.params.line_orb = v;
        self
    }
    pub fn paran_orb(mut self, v: Degree) -> Self {
        self.params.paran_orb = v;
        self
    }
    pub fn grid_step(mut self, v: Degree) -> Self {
        self.params.grid_step = v;
        self
    }

    // --- Frames ---
    pub fn approximate_obliquity(mut self, v: bool) -> Self {
        self.params.approximate_obliquity = v;
        self
    }

    // ---- Numeric helpers for PartialOrd (handle NaN as invalid) ----

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Return true iff a <= b and comparable (i.e., not NaN).
    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Return true iff a < b and comparable (i.e., not NaN).
    #[inline]
    fn lt(a: f64, b: f64) -> bool {
        a.partial_cmp(&b) == Some(Less)
    }

    /// Finalize the builder and produce a [`CartaParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `−90 < paran_latitude_min < paran_latitude_max < 90` – the scan
    ///   band must be ordered and stay off the poles.
    /// * `paran_latitude_step > 0`, `bisection_tol > 0`,
    ///   `bisection_max_iter ≥ 1`.
    /// * `0 ≤ paran_strength_threshold ≤ 1`.
    /// * `0 < acg_latitude_step`, `0 < acg_latitude_max < 90`.
    /// * `zenith_orb > 0`, `zenith_overlap_tolerance ≥ 0`.
    /// * `speed_step_days > 0`, `retrograde_epsilon ≥ 0`,
    ///   `station_search_days > 0`, `station_time_tol_days > 0`.
    /// * `−90 ≤ scoring_latitude_min ≤ scoring_latitude_max ≤ 90`,
    ///   `scoring_latitude_step > 0`, `scoring_top_n ≥ 1`.
    /// * `gaussian_sigma > 0`, `line_orb > 0`, `paran_orb > 0`,
    ///   `grid_step > 0`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(CartaParams)` if all values are valid.
    /// * `Err(AstrocartaError::InvalidParameter)` if any rule fails.
    pub fn build(self) -> Result<CartaParams, AstrocartaError> {
        let p = &self.params;

        // --- Paran search band ---
        let ok_min = Self::lt(-90.0, p.paran_latitude_min);
        let ok_order = Self::lt(p.paran_latitude_min, p.paran_latitude_max);
        let ok_max = Self::lt(p.paran_latitude_max, 90.0);
        if !(ok_min && ok_order && ok_max) {
            return Err(AstrocartaError::InvalidParameter(
                "require -90 < paran_latitude_min < paran_latitude_max < 90".into(),
            ));
        }
        if !Self::gt0(p.paran_latitude_step) {
            return Err(AstrocartaError::InvalidParameter(
                "paran_latitude_step must be > 0".into(),
            ));
        }
        if !Self::gt0(p.bisection_tol) {
            return Err(AstrocartaError::InvalidParameter(
                "bisection_tol must be > 0".into(),
            ));
        }
        if p.bisection_max_iter == 0 {
            return Err(AstrocartaError::InvalidParameter(
                "bisection_max_iter must be >= 1".into(),
            ));
        }
        if !(Self::ge0(p.paran_strength_threshold)
            && Self::le(p.paran_strength_threshold, 1.0))
        {
            return Err(AstrocartaError::InvalidParameter(
                "paran_strength_threshold must be within [0, 1]".into(),
            ));
        }

        // --- ACG sampling ---
        if !Self::gt0(p.acg_latitude_step) {
            return Err(AstrocartaError::InvalidParameter(
                "acg_latitude_step must be > 0".into(),
            ));
        }
        if !(Self::gt0(p.acg_latitude_max) && Self::lt(p.acg_latitude_max, 90.0)) {
            return Err(AstrocartaError::InvalidParameter(
                "require 0 < acg_latitude_max < 90".into(),
            ));
        }

        // --- Zenith bands ---
        if !Self::gt0(p.zenith_orb) {
            return Err(AstrocartaError::InvalidParameter(
                "zenith_orb must be > 0".into(),
            ));
        }
        if !Self::ge0(p.zenith_overlap_tolerance) {
            return Err(AstrocartaError::InvalidParameter(
                "zenith_overlap_tolerance must be >= 0".into(),
            ));
        }

        // --- Speed & stations ---
        if !Self::gt0(p.speed_step_days) {
            return Err(AstrocartaError::InvalidParameter(
                "speed_step_days must be > 0".into(),
            ));
        }
        if !Self::ge0(p.retrograde_epsilon) {
            return Err(AstrocartaError::InvalidParameter(
                "retrograde_epsilon must be >= 0".into(),
            ));
        }
        if !Self::gt0(p.station_search_days) {
            return Err(AstrocartaError::InvalidParameter(
                "station_search_days must be > 0".into(),
            ));
        }
        if !Self::gt0(p.station_time_tol_days) {
            return Err(AstrocartaError::InvalidParameter(
                "station_time_tol_days must be > 0".into(),
            ));
        }

        // --- Scoring / ranking ---
        let ok_lo = Self::le(-90.0, p.scoring_latitude_min);
        let ok_span = Self::le(p.scoring_latitude_min, p.scoring_latitude_max);
        let ok_hi = Self::le(p.scoring_latitude_max, 90.0);
        if !(ok_lo && ok_span && ok_hi) {
            return Err(AstrocartaError::InvalidParameter(
                "require -90 <= scoring_latitude_min <= scoring_latitude_max <= 90".into(),
            ));
        }
        if !Self::gt0(p.scoring_latitude_step) {
            return Err(AstrocartaError::InvalidParameter(
                "scoring_latitude_step must be > 0".into(),
            ));
        }
        if p.scoring_top_n < 1 {
            return Err(AstrocartaError::InvalidParameter(
                "scoring_top_n must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.gaussian_sigma) {
            return Err(AstrocartaError::InvalidParameter(
                "gaussian_sigma must be > 0".into(),
            ));
        }
        if !Self::gt0(p.line_orb) {
            return Err(AstrocartaError::InvalidParameter(
                "line_orb must be > 0".into(),
            ));
        }
        if !Self::gt0(p.paran_orb) {
            return Err(AstrocartaError::InvalidParameter(
                "paran_orb must be > 0".into(),
            ));
        }
        if !Self::gt0(p.grid_step) {
            return Err(AstrocartaError::InvalidParameter(
                "grid_step must be > 0".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for CartaParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 46; // width reserved for "name = value"
            writeln!(f, "Chart Computation Parameters")?;
            writeln!(f, "----------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Paran search]")?;
            line!(
                "paran_latitude_min      = {:.1} deg",
                self.paran_latitude_min,
                "Lower scan bound"
            )?;
            line!(
                "paran_latitude_max      = {:.1} deg",
                self.paran_latitude_max,
                "Upper scan bound"
            )?;
            line!(
                "paran_latitude_step     = {:.2} deg",
                self.paran_latitude_step,
                "Coarse bracketing step"
            )?;
            line!(
                "bisection_tol           = {:.1e} deg",
                self.bisection_tol,
                "Latitude convergence tolerance"
            )?;
            line!(
                "bisection_max_iter      = {}",
                self.bisection_max_iter,
                "Bisection iteration cap"
            )?;
            line!(
                "paran_strength_threshold= {:.2}",
                self.paran_strength_threshold,
                "Minimum retained strength"
            )?;

            writeln!(f, "\n[ACG sampling]")?;
            line!(
                "acg_latitude_step       = {:.2} deg",
                self.acg_latitude_step,
                "Horizon curve sampling step"
            )?;
            line!(
                "acg_latitude_max        = {:.1} deg",
                self.acg_latitude_max,
                "Horizon curve latitude clamp"
            )?;

            writeln!(f, "\n[Zenith bands]")?;
            line!(
                "zenith_orb              = {:.2} deg",
                self.zenith_orb,
                "Band half-width"
            )?;
            line!(
                "zenith_overlap_tolerance= {:.2} deg",
                self.zenith_overlap_tolerance,
                "Overlap clustering tolerance"
            )?;

            writeln!(f, "\n[Speed & stations]")?;
            line!(
                "speed_step_days         = {:.2} d",
                self.speed_step_days,
                "Central-difference half-step"
            )?;
            line!(
                "retrograde_epsilon      = {:.1e} deg/d",
                self.retrograde_epsilon,
                "Retrograde detection epsilon"
            )?;
            line!(
                "station_search_days     = {:.0} d",
                self.station_search_days,
                "Forward station search horizon"
            )?;
            line!(
                "station_time_tol_days   = {:.1e} d",
                self.station_time_tol_days,
                "Station refinement tolerance"
            )?;

            writeln!(f, "\n[Scoring / ranking]")?;
            line!(
                "scoring_latitude_min    = {:.1} deg",
                self.scoring_latitude_min,
                "Optimizer lower bound"
            )?;
            line!(
                "scoring_latitude_max    = {:.1} deg",
                self.scoring_latitude_max,
                "Optimizer upper bound"
            )?;
            line!(
                "scoring_latitude_step   = {:.2} deg",
                self.scoring_latitude_step,
                "Optimizer scan step"
            )?;
            line!(
                "scoring_top_n           = {}",
                self.scoring_top_n,
                "Latitudes retained"
            )?;
            line!(
                "gaussian_sigma          = {:.2} deg",
                self.gaussian_sigma,
                "Alignment falloff width"
            )?;
            line!(
                "line_orb                = {:.2} deg",
                self.line_orb,
                "ACG proximity scale"
            )?;
            line!(
                "paran_orb               = {:.2} deg",
                self.paran_orb,
                "Paran proximity scale"
            )?;
            line!(
                "grid_step               = {:.2} deg",
                self.grid_step,
                "World grid cell size"
            )?;

            writeln!(f, "\n[Frames]")?;
            line!(
                "approximate_obliquity   = {}",
                self.approximate_obliquity,
                "Use fixed J2000 obliquity"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "CartaParams(scan=[{:.0},{:.0}]@{:.2}, tol={:.0e}, threshold={:.2}, zenith_orb={:.1}, sigma={:.1}, top_n={})",
                self.paran_latitude_min,
                self.paran_latitude_max,
                self.paran_latitude_step,
                self.bisection_tol,
                self.paran_strength_threshold,
                self.zenith_orb,
                self.gaussian_sigma,
                self.scoring_top_n,
            )
        }
    }
}
