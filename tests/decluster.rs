//! Tests for decluster module

use geo::{Distance, Euclidean};
use geospread::decluster::{decluster, DeclusterConfig};
use geospread::{GeospreadError, PointSet, ReferenceSystem};

fn planar_set(coords: &[(f64, f64)]) -> PointSet {
    let records = coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| (format!("p{i}"), x, y))
        .collect();
    PointSet::from_projected(records, ReferenceSystem::BelgianLambert72)
}

fn config(radius: f64) -> DeclusterConfig {
    DeclusterConfig {
        radius_meters: radius,
        ..DeclusterConfig::default()
    }
}

fn named_planar_set(coords: &[(&str, f64, f64)]) -> PointSet {
    let records = coords
        .iter()
        .map(|&(id, x, y)| (id.to_string(), x, y))
        .collect();
    PointSet::from_projected(records, ReferenceSystem::BelgianLambert72)
}

#[test]
fn test_two_natural_clusters_reduce_to_one_point_each() {
    // Two clusters: a 3-point row and a 2-point pair, radius 1.5.
    let points = named_planar_set(&[
        ("a", 0.0, 0.0),
        ("b", 1.0, 0.0),
        ("c", 2.0, 0.0),
        ("d", 50.0, 50.0),
        ("e", 51.0, 50.0),
    ]);

    let spread = decluster(&points, &config(1.5)).unwrap();

    // One survivor per cluster. The central "b" is always pruned first; the
    // remaining pair in each cluster is symmetric, so either end may survive
    // depending on where the union centroid lands.
    assert_eq!(spread.len(), 2);
    let ids: Vec<&str> = spread.iter().map(|p| p.id()).collect();
    assert!(ids[0] == "a" || ids[0] == "c", "row survivor: {}", ids[0]);
    assert!(ids[1] == "d" || ids[1] == "e", "pair survivor: {}", ids[1]);
}

#[test]
fn test_survivors_are_at_least_radius_apart() {
    let points = planar_set(&[
        (0.0, 0.0),
        (3.0, 1.0),
        (5.0, 0.0),
        (6.0, 4.0),
        (9.0, 1.0),
        (12.0, 0.0),
        (13.0, 3.0),
    ]);
    let radius = 4.0;

    let spread = decluster(&points, &config(radius)).unwrap();

    let survivors: Vec<_> = spread.iter().map(|p| p.geometry()).collect();
    for i in 0..survivors.len() {
        for j in (i + 1)..survivors.len() {
            let distance = Euclidean.distance(survivors[i], survivors[j]);
            // Small tolerance for the polygonal circle approximation.
            assert!(
                distance >= radius * 0.99,
                "survivors {i} and {j} only {distance} apart"
            );
        }
    }
}

#[test]
fn test_monotone_shrink() {
    let points = planar_set(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (30.0, 0.0)]);

    let spread = decluster(&points, &config(2.0)).unwrap();

    assert!(spread.len() <= points.len());
    assert!(!spread.is_empty());
}

#[test]
fn test_zero_radius_with_distinct_points_is_identity() {
    let points = planar_set(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

    let spread = decluster(&points, &config(0.0)).unwrap();

    assert_eq!(spread.len(), 3);
    let ids: Vec<&str> = spread.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["p0", "p1", "p2"]);
}

#[test]
fn test_zero_radius_prunes_coincident_duplicates() {
    // Coincident points are all at distance zero from their zone centroid;
    // the exact tie deletes the earliest occurrence each iteration.
    let points = planar_set(&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (5.0, 0.0)]);

    let spread = decluster(&points, &config(0.0)).unwrap();

    let ids: Vec<&str> = spread.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["p2", "p3"]);
}

#[test]
fn test_idempotent_on_own_output() {
    let points = planar_set(&[
        (0.0, 0.0),
        (1.0, 0.5),
        (2.5, 0.0),
        (20.0, 20.0),
        (21.0, 20.5),
    ]);
    let config = config(3.0);

    let once = decluster(&points, &config).unwrap();
    let twice = decluster(&once, &config).unwrap();

    assert_eq!(once.len(), twice.len());
    let ids_once: Vec<&str> = once.iter().map(|p| p.id()).collect();
    let ids_twice: Vec<&str> = twice.iter().map(|p| p.id()).collect();
    assert_eq!(ids_once, ids_twice);
}

#[test]
fn test_deterministic_across_runs() {
    let coords = [
        (0.0, 0.0),
        (1.0, 1.0),
        (2.0, 0.5),
        (3.5, 1.5),
        (10.0, 10.0),
        (11.0, 10.0),
        (12.0, 11.0),
    ];
    let config = config(2.5);

    let baseline: Vec<String> = decluster(&planar_set(&coords), &config)
        .unwrap()
        .iter()
        .map(|p| p.id().to_string())
        .collect();

    for run in 0..5 {
        let ids: Vec<String> = decluster(&planar_set(&coords), &config)
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(baseline, ids, "run {run} diverged");
    }
}

#[test]
fn test_empty_input_returns_empty_set() {
    let points = planar_set(&[]);
    let spread = decluster(&points, &config(100.0)).unwrap();
    assert!(spread.is_empty());
}

#[test]
fn test_single_point_is_returned_unchanged() {
    let points = named_planar_set(&[("only", 3.0, 4.0)]);
    let spread = decluster(&points, &config(100.0)).unwrap();
    assert_eq!(spread.len(), 1);
    assert_eq!(spread.points()[0].id(), "only");
}

#[test]
fn test_invalid_geometry_aborts_before_pruning() {
    let points = planar_set(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 0.0)]);
    let result = decluster(&points, &config(10.0));
    assert!(matches!(
        result,
        Err(GeospreadError::InvalidGeometry { .. })
    ));
}

#[test]
fn test_input_set_is_not_mutated() {
    let points = planar_set(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    let before = points.len();

    let spread = decluster(&points, &config(1.5)).unwrap();

    assert_eq!(points.len(), before);
    assert!(spread.len() < before);
}

#[test]
fn test_bad_radius_is_rejected_even_for_small_inputs() {
    // Argument validation happens before the small-input early return, so
    // empty and single-point sets fail the same way multi-point sets do.
    let empty = planar_set(&[]);
    assert!(matches!(
        decluster(&empty, &config(-1.0)),
        Err(GeospreadError::InvalidArgument { .. })
    ));

    let single = planar_set(&[(0.0, 0.0)]);
    assert!(matches!(
        decluster(&single, &config(f64::NAN)),
        Err(GeospreadError::InvalidArgument { .. })
    ));
}

#[test]
fn test_unprojected_crs_is_rejected_for_single_point() {
    let single = PointSet::from_projected(
        vec![("a".to_string(), 4.35, 50.85)],
        ReferenceSystem::Wgs84,
    );
    assert!(matches!(
        decluster(&single, &config(100.0)),
        Err(GeospreadError::InvalidArgument { .. })
    ));
}

#[test]
fn test_iteration_cap_is_an_error() {
    // A cap of zero cannot even run the converged check.
    let points = planar_set(&[(0.0, 0.0), (1.0, 0.0)]);
    let config = DeclusterConfig {
        radius_meters: 1.5,
        max_iterations: 0,
        ..DeclusterConfig::default()
    };

    let result = decluster(&points, &config);
    assert!(matches!(
        result,
        Err(GeospreadError::InvariantViolation { .. })
    ));
}
