//! # Scoring, latitude optimization, grid generation and city ranking
//!
//! The consumer end of the pipeline: Gaussian-decay proximity scores over
//! the chart geometry. A latitude is scored by how closely it aligns with
//! weighted planet declinations; a city or world-grid cell is scored by
//! its proximity to zenith bands, ACG lines and paran latitudes.
//! Everything here is summation and sorting over the solver outputs, no
//! further root finding except the golden-section refinement.

use std::io::Read;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::acg::AcgLine;
use crate::astro_math::{gaussian, golden_section_max};
use crate::astrocarta_errors::AstrocartaError;
use crate::constants::{Degree, Planet, PlanetMap};
use crate::params::CartaParams;
use crate::paran::ParanCatalog;
use crate::transforms::great_circle_distance;

/// Caller-supplied emphasis for one planet. Planets without an entry do
/// not contribute; a repeated planet keeps its last entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetWeight {
    pub planet: Planet,
    pub weight: f64,
}

fn weight_map(weights: &[PlanetWeight]) -> PlanetMap<f64> {
    let mut map = PlanetMap::default();
    for entry in weights {
        map.insert(entry.planet, entry.weight);
    }
    map
}

/// Weighted declination-alignment score of one latitude.
///
/// Each weighted planet contributes `weight × gaussian(|lat − dec|)` with
/// the falloff width `sigma`, so the score peaks where the strongest
/// declinations cluster.
pub fn alignment_score(
    latitude: Degree,
    declinations: &PlanetMap<Degree>,
    weights: &[PlanetWeight],
    sigma: Degree,
) -> f64 {
    weights
        .iter()
        .map(|entry| {
            let distance = (latitude - declinations[&entry.planet]).abs();
            entry.weight * gaussian(distance, 0.0, sigma)
        })
        .sum()
}

/// One scored latitude of the optimizer scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatitudeScore {
    pub latitude: Degree,
    /// Raw weighted score
    pub score: f64,
    /// Score normalized to 0–100 by the total weight
    pub score_pct: f64,
}

/// Brute-force scan of the scoring latitude range, keeping the top-N
/// samples by score.
///
/// Arguments
/// ---------
/// * `declinations`: per-planet declinations at the epoch.
/// * `weights`: planets to favor; an empty slice yields all-zero scores.
/// * `params`: scan range, step, N and Gaussian sigma.
///
/// Return
/// ------
/// * Up to `scoring_top_n` entries sorted by score descending, latitude
///   ascending on ties.
pub fn optimal_latitudes(
    declinations: &PlanetMap<Degree>,
    weights: &[PlanetWeight],
    params: &CartaParams,
) -> Vec<LatitudeScore> {
    let total_weight: f64 = weights.iter().map(|entry| entry.weight).sum();
    let steps = ((params.scoring_latitude_max - params.scoring_latitude_min)
        / params.scoring_latitude_step)
        .round() as usize;

    let mut scored: Vec<LatitudeScore> = (0..=steps)
        .map(|i| {
            let latitude = (params.scoring_latitude_min
                + i as f64 * params.scoring_latitude_step)
                .min(params.scoring_latitude_max);
            let score = alignment_score(latitude, declinations, weights, params.gaussian_sigma);
            let score_pct = if total_weight > 0.0 {
                score / total_weight * 100.0
            } else {
                0.0
            };
            LatitudeScore {
                latitude,
                score,
                score_pct,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.latitude.total_cmp(&b.latitude))
    });
    scored.truncate(params.scoring_top_n);
    scored
}

/// Refine a latitude optimum inside a bracket by golden-section search.
///
/// The bracket usually comes from neighboring samples of
/// [`optimal_latitudes`]; a reversed bracket is accepted.
pub fn refine_latitude(
    declinations: &PlanetMap<Degree>,
    weights: &[PlanetWeight],
    lo: Degree,
    hi: Degree,
    params: &CartaParams,
) -> Degree {
    golden_section_max(
        |latitude| alignment_score(latitude, declinations, weights, params.gaussian_sigma),
        lo,
        hi,
        params.bisection_tol,
        params.bisection_max_iter,
    )
}

/// A candidate location for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: Degree,
    pub longitude: Degree,
}

/// Load cities from CSV with a `name,latitude,longitude` header.
///
/// Non-finite coordinates or latitudes outside [−90°, 90°] are rejected
/// with [`AstrocartaError::InvalidInput`].
pub fn cities_from_csv<R: Read>(reader: R) -> Result<Vec<City>, AstrocartaError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut cities = Vec::new();
    for record in csv_reader.deserialize() {
        let city: City = record?;
        validate_city(&city)?;
        cities.push(city);
    }
    Ok(cities)
}

fn validate_city(city: &City) -> Result<(), AstrocartaError> {
    if !city.latitude.is_finite()
        || !city.longitude.is_finite()
        || city.latitude.abs() > 90.0
    {
        return Err(AstrocartaError::InvalidInput(format!(
            "city '{}' has invalid coordinates ({}, {})",
            city.name, city.latitude, city.longitude
        )));
    }
    Ok(())
}

/// A ranked city with its contribution breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityScore {
    pub city: City,
    /// Sum of the three contributions
    pub score: f64,
    /// Proximity to weighted zenith latitudes
    pub zenith_score: f64,
    /// Proximity to weighted ACG lines
    pub line_score: f64,
    /// Proximity to weighted paran latitudes
    pub paran_score: f64,
}

/// Borrowed chart geometry plus resolved weights, shared by the city
/// ranking and grid consumers.
struct GeometryScorer<'a> {
    declinations: &'a PlanetMap<Degree>,
    lines: &'a [AcgLine],
    parans: &'a ParanCatalog,
    weights: &'a [PlanetWeight],
    weight_of: PlanetMap<f64>,
    params: &'a CartaParams,
}

impl GeometryScorer<'_> {
    /// The three Gaussian proximity contributions of one geographic
    /// point, as (zenith, line, paran).
    fn proximity_scores(
        &self,
        latitude: Degree,
        longitude: Degree,
    ) -> Result<(f64, f64, f64), AstrocartaError> {
        let mut zenith_score = 0.0;
        for entry in self.weights {
            let distance = (latitude - self.declinations[&entry.planet]).abs();
            zenith_score += entry.weight * gaussian(distance, 0.0, self.params.zenith_orb);
        }

        let mut line_score = 0.0;
        for line in self.lines {
            let Some(&weight) = self.weight_of.get(&line.planet) else {
                continue;
            };
            let mut nearest: Option<f64> = None;
            for point in &line.points {
                let distance =
                    great_circle_distance(latitude, longitude, point.latitude, point.longitude)?
                        .to_degrees();
                nearest = Some(nearest.map_or(distance, |d: f64| d.min(distance)));
            }
            if let Some(distance) = nearest {
                line_score += weight * gaussian(distance, 0.0, self.params.line_orb);
            }
        }

        let mut paran_score = 0.0;
        for point in &self.parans.points {
            let w1 = self.weight_of.get(&point.planet1).copied().unwrap_or(0.0);
            let w2 = self.weight_of.get(&point.planet2).copied().unwrap_or(0.0);
            let pair_weight = 0.5 * (w1 + w2);
            if pair_weight == 0.0 {
                continue;
            }
            let distance = (latitude - point.latitude).abs();
            paran_score +=
                pair_weight * point.strength * gaussian(distance, 0.0, self.params.paran_orb);
        }

        Ok((zenith_score, line_score, paran_score))
    }
}

/// Rank cities against the chart geometry.
///
/// Three Gaussian proximity contributions are summed per city:
///
/// * **zenith** – per weighted planet, distance |city lat − declination|
///   against the zenith orb;
/// * **lines** – per ACG line of a weighted planet, great-circle distance
///   to its nearest sampled point against the line orb;
/// * **parans** – per catalog point, latitude distance against the paran
///   orb, scaled by the point's strength and the mean weight of the two
///   planets involved.
///
/// Return
/// ------
/// * All cities sorted by score descending, name ascending on ties, with
///   the per-contribution breakdown retained.
pub fn rank_cities(
    cities: &[City],
    declinations: &PlanetMap<Degree>,
    lines: &[AcgLine],
    parans: &ParanCatalog,
    weights: &[PlanetWeight],
    params: &CartaParams,
) -> Result<Vec<CityScore>, AstrocartaError> {
    let scorer = GeometryScorer {
        declinations,
        lines,
        parans,
        weights,
        weight_of: weight_map(weights),
        params,
    };
    let mut ranked = Vec::with_capacity(cities.len());

    for city in cities {
        validate_city(city)?;
        let (zenith_score, line_score, paran_score) =
            scorer.proximity_scores(city.latitude, city.longitude)?;
        ranked.push(CityScore {
            city: city.clone(),
            score: zenith_score + line_score + paran_score,
            zenith_score,
            line_score,
            paran_score,
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.city.name.cmp(&b.city.name))
    });
    Ok(ranked)
}

/// One cell of the scored world grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub latitude: Degree,
    pub longitude: Degree,
    /// Sum of the three contributions
    pub score: f64,
    pub zenith_score: f64,
    pub line_score: f64,
    pub paran_score: f64,
}

/// Score a regular world grid against the chart geometry.
///
/// Every cell receives the same three Gaussian proximity contributions
/// as [`rank_cities`]: latitudes span the scoring range at `grid_step`,
/// longitudes cover [−180°, 180°) at the same step. Rows are scored in
/// parallel; the output is latitude-major, south to north then west to
/// east, regardless of scheduling.
///
/// Return
/// ------
/// * One [`GridCell`] per grid point with the contribution breakdown,
///   ready for heatmap rendering.
pub fn score_grid(
    declinations: &PlanetMap<Degree>,
    lines: &[AcgLine],
    parans: &ParanCatalog,
    weights: &[PlanetWeight],
    params: &CartaParams,
) -> Result<Vec<GridCell>, AstrocartaError> {
    let scorer = GeometryScorer {
        declinations,
        lines,
        parans,
        weights,
        weight_of: weight_map(weights),
        params,
    };

    let lat_count = ((params.scoring_latitude_max - params.scoring_latitude_min)
        / params.grid_step)
        .round() as usize;
    let latitudes: Vec<Degree> = (0..=lat_count)
        .map(|i| {
            (params.scoring_latitude_min + i as f64 * params.grid_step)
                .min(params.scoring_latitude_max)
        })
        .collect();
    let lon_count = (360.0 / params.grid_step).ceil() as usize;
    let longitudes: Vec<Degree> = (0..lon_count)
        .map(|i| -180.0 + i as f64 * params.grid_step)
        .take_while(|&lon| lon < 180.0)
        .collect();

    let rows: Result<Vec<Vec<GridCell>>, AstrocartaError> = latitudes
        .par_iter()
        .map(|&latitude| {
            longitudes
                .iter()
                .map(|&longitude| {
                    let (zenith_score, line_score, paran_score) =
                        scorer.proximity_scores(latitude, longitude)?;
                    Ok(GridCell {
                        latitude,
                        longitude,
                        score: zenith_score + line_score + paran_score,
                        zenith_score,
                        line_score,
                        paran_score,
                    })
                })
                .collect()
        })
        .collect();

    Ok(rows?.into_iter().flatten().collect())
}

#[cfg(test)]
mod scoring_test {
    use super::*;
    use crate::acg::{AcgAngle, GeoPoint};
    use crate::paran::{AngularEvent, ParanPoint, ParanSummary};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn declination_map(entries: &[(Planet, f64)]) -> PlanetMap<Degree> {
        let mut map = PlanetMap::default();
        for planet in Planet::ALL {
            let dec = entries
                .iter()
                .find(|(p, _)| *p == planet)
                .map(|&(_, d)| d)
                .unwrap_or(0.0);
            map.insert(planet, dec);
        }
        map
    }

    #[test]
    fn test_alignment_score_peak_and_falloff() {
        let decs = declination_map(&[(Planet::Sun, 30.0)]);
        let weights = [PlanetWeight {
            planet: Planet::Sun,
            weight: 1.0,
        }];

        assert_abs_diff_eq!(alignment_score(30.0, &decs, &weights, 3.0), 1.0);
        // One sigma out: exp(-0.5)
        assert_relative_eq!(
            alignment_score(33.0, &decs, &weights, 3.0),
            (-0.5_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_optimal_latitudes_finds_cluster() {
        let decs = declination_map(&[(Planet::Sun, 20.0), (Planet::Moon, 21.0)]);
        let weights = [
            PlanetWeight { planet: Planet::Sun, weight: 1.0 },
            PlanetWeight { planet: Planet::Moon, weight: 1.0 },
        ];
        let params = CartaParams::default();

        let top = optimal_latitudes(&decs, &weights, &params);
        assert_eq!(top.len(), params.scoring_top_n);
        // Best sample sits at the cluster midpoint
        assert_abs_diff_eq!(top[0].latitude, 20.5, epsilon = params.scoring_latitude_step);
        assert!(top[0].score_pct > 90.0);
        assert!(top[0].score_pct <= 100.0);
        for window in top.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn test_empty_weights_score_zero() {
        let decs = declination_map(&[]);
        let top = optimal_latitudes(&decs, &[], &CartaParams::default());
        assert!(top.iter().all(|s| s.score == 0.0 && s.score_pct == 0.0));
    }

    #[test]
    fn test_refine_latitude_converges_to_midpoint() {
        let decs = declination_map(&[(Planet::Sun, 20.0), (Planet::Moon, 21.0)]);
        let weights = [
            PlanetWeight { planet: Planet::Sun, weight: 1.0 },
            PlanetWeight { planet: Planet::Moon, weight: 1.0 },
        ];
        let params = CartaParams::default();

        let peak = refine_latitude(&decs, &weights, 15.0, 25.0, &params);
        assert_abs_diff_eq!(peak, 20.5, epsilon = 1e-3);
    }

    fn empty_catalog() -> ParanCatalog {
        ParanCatalog {
            points: Vec::new(),
            summary: ParanSummary::default(),
        }
    }

    #[test]
    fn test_rank_cities_prefers_zenith_proximity() {
        let decs = declination_map(&[(Planet::Sun, 40.0)]);
        let weights = [PlanetWeight { planet: Planet::Sun, weight: 1.0 }];
        let cities = vec![
            City { name: "Near".into(), latitude: 40.2, longitude: 10.0 },
            City { name: "Far".into(), latitude: -60.0, longitude: 10.0 },
        ];
        let params = CartaParams::default();

        let ranked =
            rank_cities(&cities, &decs, &[], &empty_catalog(), &weights, &params).unwrap();
        assert_eq!(ranked[0].city.name, "Near");
        assert!(ranked[0].zenith_score > ranked[1].zenith_score);
        assert_eq!(ranked[0].line_score, 0.0);
        assert_eq!(ranked[0].paran_score, 0.0);
    }

    #[test]
    fn test_rank_cities_line_contribution() {
        let decs = declination_map(&[]);
        let weights = [PlanetWeight { planet: Planet::Mars, weight: 2.0 }];
        // A Mars MC meridian at longitude 10
        let line = AcgLine {
            planet: Planet::Mars,
            angle: AcgAngle::Mc,
            is_circumpolar: false,
            points: (0..=80)
                .map(|i| GeoPoint { latitude: i as f64 - 40.0, longitude: 10.0 })
                .collect(),
        };
        let cities = vec![
            City { name: "OnLine".into(), latitude: 20.0, longitude: 10.0 },
            City { name: "NearLine".into(), latitude: 20.0, longitude: 15.0 },
            City { name: "OffLine".into(), latitude: 20.0, longitude: 140.0 },
        ];
        let params = CartaParams::default();

        let ranked = rank_cities(
            &cities,
            &decs,
            std::slice::from_ref(&line),
            &empty_catalog(),
            &weights,
            &params,
        )
        .unwrap();

        let on = ranked.iter().find(|r| r.city.name == "OnLine").unwrap();
        let near = ranked.iter().find(|r| r.city.name == "NearLine").unwrap();
        let off = ranked.iter().find(|r| r.city.name == "OffLine").unwrap();
        // City sits exactly on a sampled point
        assert_abs_diff_eq!(on.line_score, 2.0, epsilon = 1e-9);
        // 5° east along the 20° parallel is a 4.69829° great-circle gap
        // to the nearest sampled point; the Gaussian falloff must see that
        // gap in degrees
        let expected = 2.0 * (-0.5 * (4.698_29_f64 / params.line_orb).powi(2)).exp();
        assert_abs_diff_eq!(near.line_score, expected, epsilon = 1e-4);
        assert!(off.line_score < 1e-6);
    }

    #[test]
    fn test_rank_cities_paran_contribution() {
        let decs = declination_map(&[]);
        let weights = [
            PlanetWeight { planet: Planet::Sun, weight: 1.0 },
            PlanetWeight { planet: Planet::Moon, weight: 3.0 },
        ];
        let catalog = ParanCatalog {
            points: vec![ParanPoint {
                planet1: Planet::Sun,
                event1: AngularEvent::Rise,
                planet2: Planet::Moon,
                event2: AngularEvent::Culminate,
                latitude: 13.5,
                strength: 1.0,
            }],
            summary: ParanSummary {
                rise_culminate: 1,
                ..Default::default()
            },
        };
        let cities = vec![City { name: "AtParan".into(), latitude: 13.5, longitude: 0.0 }];
        let params = CartaParams::default();

        let ranked =
            rank_cities(&cities, &decs, &[], &catalog, &weights, &params).unwrap();
        // Mean pair weight × strength × gaussian(0) = 2.0
        assert_abs_diff_eq!(ranked[0].paran_score, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_cities_name_tiebreak() {
        let decs = declination_map(&[]);
        let cities = vec![
            City { name: "Zeta".into(), latitude: 0.0, longitude: 0.0 },
            City { name: "Alpha".into(), latitude: 0.0, longitude: 0.0 },
        ];
        let ranked = rank_cities(
            &cities,
            &decs,
            &[],
            &empty_catalog(),
            &[],
            &CartaParams::default(),
        )
        .unwrap();
        assert_eq!(ranked[0].city.name, "Alpha");
        assert_eq!(ranked[1].city.name, "Zeta");
    }

    #[test]
    fn test_rank_cities_rejects_bad_coordinates() {
        let decs = declination_map(&[]);
        let cities = vec![City { name: "Nowhere".into(), latitude: 95.0, longitude: 0.0 }];
        let result = rank_cities(
            &cities,
            &decs,
            &[],
            &empty_catalog(),
            &[],
            &CartaParams::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_score_grid_extent_and_order() {
        let decs = declination_map(&[]);
        let params = CartaParams::default();
        let grid = score_grid(&decs, &[], &empty_catalog(), &[], &params).unwrap();

        // 29 latitude rows of 72 cells at the 5° default step
        assert_eq!(grid.len(), 29 * 72);
        assert_abs_diff_eq!(grid[0].latitude, -70.0);
        assert_abs_diff_eq!(grid[0].longitude, -180.0);
        assert_abs_diff_eq!(grid[71].longitude, 175.0);
        assert_abs_diff_eq!(grid[72].latitude, -65.0);
        let last = grid.last().unwrap();
        assert_abs_diff_eq!(last.latitude, 70.0);
        assert_abs_diff_eq!(last.longitude, 175.0);
        // The +180° column would duplicate −180°
        assert!(grid.iter().all(|c| c.longitude < 180.0));
    }

    #[test]
    fn test_score_grid_peaks_at_zenith_latitude() {
        let decs = declination_map(&[(Planet::Sun, 20.0)]);
        let weights = [PlanetWeight { planet: Planet::Sun, weight: 1.0 }];
        let params = CartaParams::default();

        let grid = score_grid(&decs, &[], &empty_catalog(), &weights, &params).unwrap();
        let best = grid.iter().max_by(|a, b| a.score.total_cmp(&b.score)).unwrap();
        assert_abs_diff_eq!(best.latitude, 20.0);
        assert_abs_diff_eq!(best.zenith_score, 1.0, epsilon = 1e-12);
        // Pure zenith geometry: no line or paran contribution anywhere
        assert!(grid.iter().all(|c| c.line_score == 0.0 && c.paran_score == 0.0));
    }

    #[test]
    fn test_score_grid_matches_city_ranking() {
        let decs = declination_map(&[(Planet::Sun, 20.0)]);
        let weights = [PlanetWeight { planet: Planet::Sun, weight: 1.5 }];
        let line = AcgLine {
            planet: Planet::Sun,
            angle: AcgAngle::Mc,
            is_circumpolar: false,
            points: (0..=80)
                .map(|i| GeoPoint { latitude: i as f64 - 40.0, longitude: 10.0 })
                .collect(),
        };
        let catalog = ParanCatalog {
            points: vec![ParanPoint {
                planet1: Planet::Sun,
                event1: AngularEvent::Rise,
                planet2: Planet::Moon,
                event2: AngularEvent::Set,
                latitude: 20.0,
                strength: 0.8,
            }],
            summary: ParanSummary {
                rise_set: 1,
                ..Default::default()
            },
        };
        let params = CartaParams::default();

        let grid = score_grid(
            &decs,
            std::slice::from_ref(&line),
            &catalog,
            &weights,
            &params,
        )
        .unwrap();
        // (20°, 10°) lies on the default grid and on the meridian line
        let cell = grid
            .iter()
            .find(|c| c.latitude == 20.0 && c.longitude == 10.0)
            .unwrap();
        assert!(cell.zenith_score > 0.0);
        assert!(cell.line_score > 0.0);
        assert!(cell.paran_score > 0.0);

        let cities = vec![City { name: "Cell".into(), latitude: 20.0, longitude: 10.0 }];
        let ranked = rank_cities(
            &cities,
            &decs,
            std::slice::from_ref(&line),
            &catalog,
            &weights,
            &params,
        )
        .unwrap();

        assert_abs_diff_eq!(cell.score, ranked[0].score, epsilon = 1e-12);
        assert_abs_diff_eq!(cell.zenith_score, ranked[0].zenith_score, epsilon = 1e-12);
        assert_abs_diff_eq!(cell.line_score, ranked[0].line_score, epsilon = 1e-12);
        assert_abs_diff_eq!(cell.paran_score, ranked[0].paran_score, epsilon = 1e-12);
    }

    #[test]
    fn test_cities_from_csv() {
        let data = "name,latitude,longitude\nLos Angeles,34.05,-118.25\nNew York,40.71,-74.01\n";
        let cities = cities_from_csv(data.as_bytes()).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Los Angeles");
        assert_abs_diff_eq!(cities[1].latitude, 40.71);
    }

    #[test]
    fn test_cities_from_csv_rejects_out_of_range() {
        let data = "name,latitude,longitude\nBroken,123.0,10.0\n";
        assert!(cities_from_csv(data.as_bytes()).is_err());

        let non_finite = "name,latitude,longitude\nBroken,NaN,10.0\n";
        assert!(cities_from_csv(non_finite.as_bytes()).is_err());
    }
}
