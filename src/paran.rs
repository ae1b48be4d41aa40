//! # Paran solver
//!
//! A paran (paranatellonta) is a latitude at which two bodies stand at
//! angular positions *simultaneously*: one rising while the other
//! culminates, both setting at once, and so on. This module finds every
//! such latitude for all unordered planet pairs and all 16 event
//! combinations, and aggregates the result into a catalog.
//!
//! ## Method
//!
//! For a pair `(body1, event1, body2, event2)` the solver studies the
//! timing difference
//!
//! ```text
//! f(lat) = normalize_symmetric(LST(body1, event1, lat) − LST(body2, event2, lat))
//! ```
//!
//! where `LST(body, event, lat) = normalize(RA + hour_angle(event, lat))`
//! and the hour angle is 0° for culmination, 180° for anti-culmination,
//! and ∓SDA for rising/setting (absent where the body is circumpolar).
//! `f` is sampled over the latitude band at a coarse step; adjacent
//! samples of opposite sign bracket a root, which bisection refines to
//! the configured tolerance. Sign changes where either magnitude reaches
//! 90° are wraparound artifacts of the ±180° seam, not zero crossings,
//! and are rejected.
//!
//! Each converged root is graded by `strength = 1 − |residual|/180`: an
//! exact coincidence scores 1.0, while a jump discontinuity mistaken for
//! a root keeps a large residual and falls below the strength threshold.
//!
//! ## Determinism
//!
//! Pairs are iterated in canonical order (`i < j` over [`Planet::ALL`])
//! and solved in parallel; results are assembled in pair order and sorted
//! by strength descending with a full tiebreak chain, so a catalog is
//! bit-reproducible for a given ephemeris input regardless of thread
//! scheduling.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::astro_math::{bisection_solve, normalize_degrees, normalize_degrees_symmetric};
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, Planet};
use crate::params::CartaParams;
use crate::positions::ChartPositions;
use crate::sda::semi_diurnal_arc;

/// The four moments a body crosses the horizon or the meridian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngularEvent {
    Rise,
    Set,
    Culminate,
    AntiCulminate,
}

impl AngularEvent {
    /// Canonical iteration order of the event combinations.
    pub const ALL: [AngularEvent; 4] = [
        AngularEvent::Rise,
        AngularEvent::Set,
        AngularEvent::Culminate,
        AngularEvent::AntiCulminate,
    ];
}

impl fmt::Display for AngularEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AngularEvent::Rise => "rise",
            AngularEvent::Set => "set",
            AngularEvent::Culminate => "culminate",
            AngularEvent::AntiCulminate => "anti_culminate",
        };
        write!(f, "{name}")
    }
}

/// Equatorial state of one body entering the pair search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParanBody {
    pub planet: Planet,
    pub right_ascension: Degree,
    pub declination: Degree,
}

/// Local sidereal time at which `event` occurs for a body at the given
/// latitude, degrees [0°, 360°).
///
/// Returns `None` when the event does not occur there (rise/set of a
/// circumpolar body) or the inputs are outside the valid domain.
pub fn event_sidereal_time(
    right_ascension: Degree,
    declination: Degree,
    event: AngularEvent,
    latitude: Degree,
) -> Option<Degree> {
    let hour_angle = match event {
        AngularEvent::Culminate => Some(0.0),
        AngularEvent::AntiCulminate => Some(180.0),
        AngularEvent::Rise => semi_diurnal_arc(latitude, declination).ok()?.rise_hour_angle(),
        AngularEvent::Set => semi_diurnal_arc(latitude, declination).ok()?.set_hour_angle(),
    }?;
    Some(normalize_degrees(right_ascension + hour_angle))
}

/// Symmetric LST difference between two body events at one latitude,
/// degrees (−180°, 180°]; `None` when either event is absent.
pub fn timing_difference(
    body1: &ParanBody,
    event1: AngularEvent,
    body2: &ParanBody,
    event2: AngularEvent,
    latitude: Degree,
) -> Option<Degree> {
    let lst1 = event_sidereal_time(body1.right_ascension, body1.declination, event1, latitude)?;
    let lst2 = event_sidereal_time(body2.right_ascension, body2.declination, event2, latitude)?;
    Some(normalize_degrees_symmetric(lst1 - lst2))
}

/// One latitude where two body events coincide.
///
/// `planet1` always precedes `planet2` in the canonical [`Planet::ALL`]
/// order, so `(A, B)` and `(B, A)` never both appear in a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParanPoint {
    pub planet1: Planet,
    pub event1: AngularEvent,
    pub planet2: Planet,
    pub event2: AngularEvent,
    /// Geographic latitude of the coincidence, degrees
    pub latitude: Degree,
    /// 1.0 at an exact coincidence, decaying linearly with the residual
    /// timing mismatch; always within [0, 1]
    pub strength: f64,
}

/// Cooperative cancellation flag shared with a long paran search.
///
/// Clones share one flag, so a cancel from any handle reaches the
/// search. A cancelled search returns [`AstrocartaError::Cancelled`]
/// with no partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
    }
}

/// All parans of one canonical pair, across the 16 event combinations.
///
/// Samples the timing difference over the latitude band, brackets genuine
/// sign changes (wraparound artifacts rejected), refines each bracket by
/// bisection and grades the root by residual strength. Crossings weaker
/// than the threshold are dropped.
///
/// A cancelled token empties the result early; the catalog layer turns
/// that into [`AstrocartaError::Cancelled`].
pub fn find_parans(
    body1: &ParanBody,
    body2: &ParanBody,
    params: &CartaParams,
    token: &CancelToken,
) -> SmallVec<[ParanPoint; 4]> {
    let mut points = SmallVec::new();

    let steps = ((params.paran_latitude_max - params.paran_latitude_min)
        / params.paran_latitude_step)
        .round() as usize;

    for event1 in AngularEvent::ALL {
        for event2 in AngularEvent::ALL {
            if token.is_cancelled() {
                return SmallVec::new();
            }

            let f = |latitude: Degree| timing_difference(body1, event1, body2, event2, latitude);

            let mut previous: Option<(Degree, f64)> = None;
            for i in 0..=steps {
                let latitude = (params.paran_latitude_min
                    + i as f64 * params.paran_latitude_step)
                    .min(params.paran_latitude_max);
                let value = f(latitude);

                if let (Some((lat_prev, v_prev)), Some(v)) = (previous, value) {
                    // Opposite signs bracket a root; magnitudes at or
                    // beyond 90° are ±180° seam artifacts
                    if v_prev * v < 0.0 && v_prev.abs() < 90.0 && v.abs() < 90.0 {
                        let result = bisection_solve(
                            &f,
                            lat_prev,
                            latitude,
                            params.bisection_tol,
                            params.bisection_max_iter,
                        );
                        if result.converged {
                            if let (Some(root), Some(residual)) =
                                (result.root, result.root.and_then(&f))
                            {
                                let strength = 1.0 - residual.abs() / 180.0;
                                if strength >= params.paran_strength_threshold {
                                    points.push(ParanPoint {
                                        planet1: body1.planet,
                                        event1,
                                        planet2: body2.planet,
                                        event2,
                                        latitude: root,
                                        strength,
                                    });
                                }
                            }
                        }
                    }
                }

                previous = value.map(|v| (latitude, v));
            }
        }
    }

    points
}

/// Event-category bucket of the catalog summary. Anti-culmination counts
/// as culmination, and the pair is order-insensitive, leaving six
/// distinct buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParanCategory {
    RiseRise,
    RiseCulminate,
    RiseSet,
    CulminateCulminate,
    CulminateSet,
    SetSet,
}

impl ParanCategory {
    /// Normalize an event pair into its bucket.
    pub fn classify(event1: AngularEvent, event2: AngularEvent) -> ParanCategory {
        #[derive(PartialEq)]
        enum Folded {
            Rise,
            Culminate,
            Set,
        }
        fn fold(event: AngularEvent) -> Folded {
            match event {
                AngularEvent::Rise => Folded::Rise,
                AngularEvent::Set => Folded::Set,
                AngularEvent::Culminate | AngularEvent::AntiCulminate => Folded::Culminate,
            }
        }

        match (fold(event1), fold(event2)) {
            (Folded::Rise, Folded::Rise) => ParanCategory::RiseRise,
            (Folded::Rise, Folded::Culminate) | (Folded::Culminate, Folded::Rise) => {
                ParanCategory::RiseCulminate
            }
            (Folded::Rise, Folded::Set) | (Folded::Set, Folded::Rise) => ParanCategory::RiseSet,
            (Folded::Culminate, Folded::Culminate) => ParanCategory::CulminateCulminate,
            (Folded::Culminate, Folded::Set) | (Folded::Set, Folded::Culminate) => {
                ParanCategory::CulminateSet
            }
            (Folded::Set, Folded::Set) => ParanCategory::SetSet,
        }
    }
}

/// Per-bucket counts of a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParanSummary {
    pub rise_rise: usize,
    pub rise_culminate: usize,
    pub rise_set: usize,
    pub culminate_culminate: usize,
    pub culminate_set: usize,
    pub set_set: usize,
}

impl ParanSummary {
    fn record(&mut self, category: ParanCategory) {
        match category {
            ParanCategory::RiseRise => self.rise_rise += 1,
            ParanCategory::RiseCulminate => self.rise_culminate += 1,
            ParanCategory::RiseSet => self.rise_set += 1,
            ParanCategory::CulminateCulminate => self.culminate_culminate += 1,
            ParanCategory::CulminateSet => self.culminate_set += 1,
            ParanCategory::SetSet => self.set_set += 1,
        }
    }

    pub fn count(&self, category: ParanCategory) -> usize {
        match category {
            ParanCategory::RiseRise => self.rise_rise,
            ParanCategory::RiseCulminate => self.rise_culminate,
            ParanCategory::RiseSet => self.rise_set,
            ParanCategory::CulminateCulminate => self.culminate_culminate,
            ParanCategory::CulminateSet => self.culminate_set,
            ParanCategory::SetSet => self.set_set,
        }
    }

    pub fn total(&self) -> usize {
        self.rise_rise
            + self.rise_culminate
            + self.rise_set
            + self.culminate_culminate
            + self.culminate_set
            + self.set_set
    }
}

/// Full paran catalog of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParanCatalog {
    /// Points sorted by strength descending, latitude ascending on ties
    pub points: Vec<ParanPoint>,
    pub summary: ParanSummary,
}

/// Catalog sort: strength descending, then latitude ascending, then the
/// canonical pair/event identity so equal-strength ties stay stable
/// across runs.
fn catalog_ordering(a: &ParanPoint, b: &ParanPoint) -> std::cmp::Ordering {
    b.strength
        .total_cmp(&a.strength)
        .then_with(|| a.latitude.total_cmp(&b.latitude))
        .then_with(|| {
            (a.planet1, a.planet2, a.event1, a.event2)
                .cmp(&(b.planet1, b.planet2, b.event1, b.event2))
        })
}

/// Compute the paran catalog of a chart: 45 canonical pairs × 16 event
/// combinations, solved in parallel.
///
/// Arguments
/// ---------
/// * `positions`: per-planet chart state (supplies RA/declination).
/// * `params`: latitude band, sampling step, bisection tolerances and
///   strength threshold.
/// * `token`: cooperative cancellation; a cancelled search returns
///   [`AstrocartaError::Cancelled`] and discards all partial work.
///
/// Return
/// ------
/// * The catalog with points in canonical sort order and per-bucket
///   summary counts.
///
/// See also
/// ------------
/// * [`find_parans`] – the single-pair building block.
pub fn paran_catalog(
    positions: &ChartPositions,
    params: &CartaParams,
    token: &CancelToken,
) -> Result<ParanCatalog, AstrocartaError> {
    let bodies: Vec<ParanBody> = Planet::ALL
        .iter()
        .map(|&planet| {
            let coord = positions.equatorial(planet);
            ParanBody {
                planet,
                right_ascension: coord.right_ascension,
                declination: coord.declination,
            }
        })
        .collect();

    let pairs: Vec<(&ParanBody, &ParanBody)> = bodies.iter().tuple_combinations().collect();

    let per_pair: Vec<SmallVec<[ParanPoint; 4]>> = pairs
        .par_iter()
        .map(|(body1, body2)| find_parans(body1, body2, params, token))
        .collect();

    if token.is_cancelled() {
        return Err(AstrocartaError::Cancelled);
    }

    let mut points: Vec<ParanPoint> = per_pair.into_iter().flatten().collect();
    points.sort_by(catalog_ordering);

    let mut summary = ParanSummary::default();
    for point in &points {
        summary.record(ParanCategory::classify(point.event1, point.event2));
    }

    Ok(ParanCatalog { points, summary })
}
