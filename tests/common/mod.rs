use astrocarta::astrocarta::Astrocarta;
use astrocarta::constants::{JulianDay, Planet};
use astrocarta::ephemeris::kernel::ChartKernel;
use astrocarta::ephemeris::EclipticPosition;

/// Reference chart epoch shared by the integration suites.
pub const EPOCH: JulianDay = 2451545.0;

/// Daily longitude rate of the synthetic motion, degrees/day.
pub fn reference_rate(planet: Planet) -> f64 {
    0.85 + 0.03 * planet.index() as f64
}

/// Analytic ecliptic state of the synthetic motion at `jd`.
pub fn reference_position(planet: Planet, jd: JulianDay) -> EclipticPosition {
    let t = jd - EPOCH;
    let index = planet.index() as f64;
    EclipticPosition {
        longitude: (index * 36.0 + 5.0 + reference_rate(planet) * t).rem_euclid(360.0),
        latitude: index * 1.2 - 5.0,
        distance: 1.0 + 0.5 * index,
        longitude_speed: reference_rate(planet),
        latitude_speed: 0.0,
        distance_speed: 0.0,
    }
}

/// Snapshot kernel covering EPOCH ± 30 days at daily cadence.
///
/// The synthetic motion is linear in time, so the kernel's piecewise
/// interpolation reproduces it exactly and every suite sees the same
/// chart.
pub fn reference_kernel() -> ChartKernel {
    let mut samples = Vec::new();
    for day in -30..=30 {
        let jd = EPOCH + day as f64;
        for planet in Planet::ALL {
            samples.push((jd, planet, reference_position(planet, jd)));
        }
    }
    ChartKernel::from_samples(samples).unwrap()
}

/// Engine over the reference kernel with default parameters.
pub fn reference_engine() -> Astrocarta<ChartKernel> {
    Astrocarta::new(reference_kernel())
}
