use std::env;

use astrocarta::astrocarta::Astrocarta;
use astrocarta::astrocarta_errors::AstrocartaError;
use astrocarta::constants::{JulianDay, Planet};
use astrocarta::ephemeris::kernel::ChartKernel;
use astrocarta::ephemeris::EclipticPosition;
use astrocarta::scoring::{City, PlanetWeight};

/// Build a synthetic snapshot kernel covering `jd` ± 30 days.
///
/// Arguments
/// -----------------
/// * `jd`: Center epoch of the snapshot, Julian Date.
///
/// Return
/// ----------
/// * A [`ChartKernel`] with daily samples for all ten planets, moving on
///   slow linear ecliptic tracks.
///
/// See also
/// ------------
/// * [`ChartKernel::from_csv_path`] – Load a real snapshot instead.
fn synthetic_kernel(jd: JulianDay) -> Result<ChartKernel, AstrocartaError> {
    let mut samples = Vec::new();
    for day in -30..=30 {
        let t = day as f64;
        for planet in Planet::ALL {
            let index = planet.index() as f64;
            let rate = 0.85 + 0.03 * index;
            samples.push((
                jd + t,
                planet,
                EclipticPosition {
                    longitude: (index * 36.0 + 5.0 + rate * t).rem_euclid(360.0),
                    latitude: index * 1.2 - 5.0,
                    distance: 1.0 + 0.5 * index,
                    longitude_speed: rate,
                    latitude_speed: 0.0,
                    distance_speed: 0.0,
                },
            ));
        }
    }
    ChartKernel::from_samples(samples)
}

/// Minimal driver: compute the full relocation geometry for one epoch.
/// Usage:
///   full_chart_once [JD] [--verbose]
/// Example:
///   full_chart_once 2451545.0 --verbose
fn main() -> Result<(), AstrocartaError> {
    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let verbose = if let Some(pos) = args.iter().position(|a| a == "--verbose") {
        args.remove(pos);
        true
    } else {
        false
    };

    let jd: JulianDay = args
        .first()
        .and_then(|a| a.parse().ok())
        .unwrap_or(2451545.0);

    let engine = Astrocarta::new(synthetic_kernel(jd)?);
    let chart = engine.full_chart(jd)?;

    println!(
        "[full_chart_once] JD {jd}: {} ACG lines, {} parans, {} zenith overlaps",
        chart.acg_lines.len(),
        chart.parans.points.len(),
        chart.zenith_overlaps.len()
    );
    let oob: Vec<Planet> = Planet::ALL
        .into_iter()
        .filter(|p| chart.oob[p].out_of_bounds)
        .collect();
    println!("[full_chart_once] out of bounds: {oob:?}");

    if verbose {
        for point in chart.parans.points.iter().take(10) {
            eprintln!(
                "[full_chart_once] {} {} / {} {} at {:+.3}° (strength {:.3})",
                point.planet1,
                point.event1,
                point.planet2,
                point.event2,
                point.latitude,
                point.strength
            );
        }

        let weights = [
            PlanetWeight {
                planet: Planet::Sun,
                weight: 1.0,
            },
            PlanetWeight {
                planet: Planet::Jupiter,
                weight: 2.0,
            },
        ];
        let cities = vec![
            City {
                name: "Lisbon".into(),
                latitude: 38.72,
                longitude: -9.14,
            },
            City {
                name: "Kyoto".into(),
                latitude: 35.01,
                longitude: 135.77,
            },
            City {
                name: "Cusco".into(),
                latitude: -13.53,
                longitude: -71.97,
            },
        ];
        for score in engine.rank_cities(jd, &cities, &weights)? {
            eprintln!(
                "[full_chart_once] {:<10} total {:.4} (zenith {:.4}, lines {:.4}, parans {:.4})",
                score.city.name,
                score.score,
                score.zenith_score,
                score.line_score,
                score.paran_score
            );
        }
    }

    Ok(())
}
