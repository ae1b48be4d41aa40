use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use astrocarta::constants::Planet;
use astrocarta::params::CartaParams;
use astrocarta::paran::{find_parans, paran_catalog, CancelToken, ParanBody};
use astrocarta::positions::ChartPositions;
use astrocarta::ephemeris::{EclipticPosition, Ephemeris};
use astrocarta::astrocarta_errors::AstrocartaError;

/// Random body of one planet with declination confined to ±`dec_span`.
#[inline]
fn rand_body(rng: &mut StdRng, planet: Planet, dec_span: f64) -> ParanBody {
    ParanBody {
        planet,
        right_ascension: rng.random::<f64>() * 360.0,
        declination: (rng.random::<f64>() * 2.0 - 1.0) * dec_span,
    }
}

/// Synthetic ephemeris with fixed per-planet positions, for catalog-scale runs.
struct RandomChart {
    longitudes: [f64; 10],
    latitudes: [f64; 10],
}

impl RandomChart {
    fn seeded(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut longitudes = [0.0; 10];
        let mut latitudes = [0.0; 10];
        for i in 0..10 {
            longitudes[i] = rng.random::<f64>() * 360.0;
            latitudes[i] = (rng.random::<f64>() * 2.0 - 1.0) * 6.0;
        }
        RandomChart {
            longitudes,
            latitudes,
        }
    }
}

impl Ephemeris for RandomChart {
    fn body_position(
        &self,
        _jd: f64,
        planet: Planet,
    ) -> Result<EclipticPosition, AstrocartaError> {
        let i = planet.index();
        Ok(EclipticPosition {
            longitude: self.longitudes[i],
            latitude: self.latitudes[i],
            distance: 1.0,
            longitude_speed: 1.0,
            latitude_speed: 0.0,
            distance_speed: 0.0,
        })
    }
}

/// Ecliptic-belt regime: declinations within ±25°, the common case.
fn bench_single_pair_belt(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xCA55E77E);
    let params = CartaParams::new();
    let token = CancelToken::new();
    let samples = 50usize;

    c.bench_function("paran_search/single_pair_dec<=25", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| {
                        (
                            rand_body(&mut rng, Planet::Sun, 25.0),
                            rand_body(&mut rng, Planet::Mars, 25.0),
                        )
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (body1, body2) in &cases {
                    let points =
                        find_parans(black_box(body1), black_box(body2), &params, &token);
                    black_box(points);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// High-declination regime: large circumpolar truncation, sparse brackets.
fn bench_single_pair_high_declination(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5EED1E55);
    let params = CartaParams::new();
    let token = CancelToken::new();
    let samples = 50usize;

    c.bench_function("paran_search/single_pair_dec_40..65", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| {
                        let mut body1 = rand_body(&mut rng, Planet::Moon, 65.0);
                        let mut body2 = rand_body(&mut rng, Planet::Pluto, 65.0);
                        body1.declination = body1.declination.signum()
                            * (40.0 + body1.declination.abs() * 25.0 / 65.0);
                        body2.declination = body2.declination.signum()
                            * (40.0 + body2.declination.abs() * 25.0 / 65.0);
                        (body1, body2)
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (body1, body2) in &cases {
                    let points =
                        find_parans(black_box(body1), black_box(body2), &params, &token);
                    black_box(points);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Full 45-pair catalog over one chart, including the parallel fan-out.
fn bench_full_catalog(c: &mut Criterion) {
    let chart = RandomChart::seeded(0xA5C911E5);
    let params = CartaParams::new();
    let positions = ChartPositions::compute(&chart, 2451545.0, &params).unwrap();
    let token = CancelToken::new();

    c.bench_function("paran_search/full_catalog_45_pairs", |b| {
        b.iter(|| {
            let catalog = paran_catalog(black_box(&positions), &params, &token).unwrap();
            black_box(catalog.points.len());
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_single_pair_belt, bench_single_pair_high_declination, bench_full_catalog
);
criterion_main!(benches);
