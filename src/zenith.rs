//! # Zenith bands and overlaps
//!
//! A planet passes directly overhead along the latitude equal to its
//! declination; the zenith band widens that latitude by a configurable
//! orb. Overlap detection clusters planets whose declinations sit within
//! a tolerance of each other, merging them into combined targets for the
//! scoring layer. This is a single sorted clustering pass, not a search.

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Planet, PlanetMap};
use crate::params::CartaParams;

/// The zenith band of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZenithLine {
    pub planet: Planet,
    /// Latitude of exact overhead passage (= declination at epoch), degrees
    pub latitude: Degree,
    /// Southern edge of the band, `latitude − orb`
    pub orb_min: Degree,
    /// Northern edge of the band, `latitude + orb`
    pub orb_max: Degree,
}

/// A cluster of planets whose zenith latitudes coincide within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZenithOverlap {
    /// Members in canonical [`Planet::ALL`] order
    pub planets: Vec<Planet>,
    /// Mean member declination, degrees
    pub latitude: Degree,
    /// Spread between the extreme member declinations, degrees
    pub span: Degree,
}

/// Zenith bands for all planets, in [`Planet::ALL`] order.
pub fn zenith_lines(declinations: &PlanetMap<Degree>, params: &CartaParams) -> Vec<ZenithLine> {
    Planet::ALL
        .iter()
        .map(|&planet| {
            let latitude = declinations[&planet];
            ZenithLine {
                planet,
                latitude,
                orb_min: latitude - params.zenith_orb,
                orb_max: latitude + params.zenith_orb,
            }
        })
        .collect()
}

/// Cluster zenith latitudes by declination proximity.
///
/// Planets are sorted by declination and chained greedily: a planet joins
/// the current cluster while its declination lies within
/// [`zenith_overlap_tolerance`](CartaParams::zenith_overlap_tolerance) of
/// the previous member. Only clusters of two or more planets are
/// reported, ordered by latitude ascending.
pub fn zenith_overlaps(
    declinations: &PlanetMap<Degree>,
    params: &CartaParams,
) -> Vec<ZenithOverlap> {
    let mut by_declination: Vec<(Planet, Degree)> = Planet::ALL
        .iter()
        .map(|&planet| (planet, declinations[&planet]))
        .collect();
    by_declination.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut overlaps = Vec::new();
    let mut cluster: Vec<(Planet, Degree)> = Vec::new();

    let mut flush = |cluster: &mut Vec<(Planet, Degree)>| {
        if cluster.len() >= 2 {
            let mut planets: Vec<Planet> = cluster.iter().map(|&(p, _)| p).collect();
            planets.sort();
            let sum: f64 = cluster.iter().map(|&(_, d)| d).sum();
            let span = cluster[cluster.len() - 1].1 - cluster[0].1;
            overlaps.push(ZenithOverlap {
                planets,
                latitude: sum / cluster.len() as f64,
                span,
            });
        }
        cluster.clear();
    };

    for (planet, declination) in by_declination {
        match cluster.last() {
            Some(&(_, last)) if declination - last <= params.zenith_overlap_tolerance => {
                cluster.push((planet, declination));
            }
            Some(_) => {
                flush(&mut cluster);
                cluster.push((planet, declination));
            }
            None => cluster.push((planet, declination)),
        }
    }
    flush(&mut cluster);

    overlaps
}
