use astrocarta::astrocarta_errors::AstrocartaError;
use astrocarta::paran::{timing_difference, CancelToken, ParanBody, ParanCategory};

mod common;
use common::{reference_engine, EPOCH};

#[test]
fn test_catalog_pairs_are_canonical_and_unique() {
    let engine = reference_engine();
    let catalog = engine.paran_catalog(EPOCH).unwrap();

    let mut seen = Vec::new();
    for point in &catalog.points {
        assert!(point.planet1.index() < point.planet2.index());

        // A paran is unique up to its pair, events and converged latitude
        let key = (
            point.planet1,
            point.event1,
            point.planet2,
            point.event2,
            (point.latitude * 1.0e3).round() as i64,
        );
        assert!(!seen.contains(&key), "duplicate paran {key:?}");
        seen.push(key);
    }
}

#[test]
fn test_strengths_and_latitudes_within_bounds() {
    let engine = reference_engine();
    let params = engine.params().clone();
    let catalog = engine.paran_catalog(EPOCH).unwrap();

    assert!(!catalog.points.is_empty());
    for point in &catalog.points {
        assert!((0.0..=1.0).contains(&point.strength));
        assert!(point.strength >= params.paran_strength_threshold);
        assert!(point.latitude >= params.paran_latitude_min);
        assert!(point.latitude <= params.paran_latitude_max);
    }
}

#[test]
fn test_catalog_sorted_by_strength_then_latitude() {
    let engine = reference_engine();
    let catalog = engine.paran_catalog(EPOCH).unwrap();

    for window in catalog.points.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        assert!(a.strength >= b.strength);
        if a.strength == b.strength {
            assert!(a.latitude <= b.latitude);
        }
    }
}

#[test]
fn test_reported_strength_matches_residual() {
    let engine = reference_engine();
    let chart = engine.chart_positions(EPOCH).unwrap();
    let catalog = engine.paran_catalog(EPOCH).unwrap();

    for point in catalog.points.iter().take(10) {
        let body1 = ParanBody {
            planet: point.planet1,
            right_ascension: chart.equatorial(point.planet1).right_ascension,
            declination: chart.declination(point.planet1),
        };
        let body2 = ParanBody {
            planet: point.planet2,
            right_ascension: chart.equatorial(point.planet2).right_ascension,
            declination: chart.declination(point.planet2),
        };

        let residual =
            timing_difference(&body1, point.event1, &body2, point.event2, point.latitude)
                .unwrap();
        let recomputed = 1.0 - residual.abs() / 180.0;
        assert!((recomputed - point.strength).abs() < 1.0e-9);
    }
}

#[test]
fn test_summary_counts_match_classification() {
    let engine = reference_engine();
    let catalog = engine.paran_catalog(EPOCH).unwrap();

    assert_eq!(catalog.summary.total(), catalog.points.len());

    let mut expected = [0usize; 6];
    for point in &catalog.points {
        let slot = match ParanCategory::classify(point.event1, point.event2) {
            ParanCategory::RiseRise => 0,
            ParanCategory::RiseCulminate => 1,
            ParanCategory::RiseSet => 2,
            ParanCategory::CulminateCulminate => 3,
            ParanCategory::CulminateSet => 4,
            ParanCategory::SetSet => 5,
        };
        expected[slot] += 1;
    }
    assert_eq!(catalog.summary.rise_rise, expected[0]);
    assert_eq!(catalog.summary.rise_culminate, expected[1]);
    assert_eq!(catalog.summary.rise_set, expected[2]);
    assert_eq!(catalog.summary.culminate_culminate, expected[3]);
    assert_eq!(catalog.summary.culminate_set, expected[4]);
    assert_eq!(catalog.summary.set_set, expected[5]);
}

#[test]
fn test_catalog_reproducible_across_runs() {
    let engine = reference_engine();
    let first = engine.paran_catalog(EPOCH).unwrap();
    let second = engine
        .paran_catalog_with_token(EPOCH, &CancelToken::new())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_catalog_independent_of_thread_count() {
    let engine = reference_engine();
    let parallel = engine.paran_catalog(EPOCH).unwrap();

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| engine.paran_catalog(EPOCH))
        .unwrap();

    assert_eq!(parallel, single);
}

#[test]
fn test_cancellation_returns_no_partial_catalog() {
    let engine = reference_engine();
    let token = CancelToken::new();
    token.cancel();

    let result = engine.paran_catalog_with_token(EPOCH, &token);
    assert_eq!(result.unwrap_err(), AstrocartaError::Cancelled);
}
