//! Tests for proximity module

use approx::assert_relative_eq;
use geospread::partition::buffer_point;
use geospread::{
    analyze, average_distance, geodesic_distance, GeospreadError, Poi, PoiIndex, PointRecord,
    PointSet, ProximityResult, ReferenceSystem,
};
use geo::Point;
use uuid::Uuid;

/// A POI whose service area is a circle around the projected WGS84 center.
fn poi_at(id: &str, latitude: f64, longitude: f64, crs: ReferenceSystem) -> Poi {
    let center = crs.project_point(Point::new(longitude, latitude));
    let service_area = buffer_point(center, 500.0, 16);
    Poi::new(id, latitude, longitude, service_area).unwrap()
}

fn result_with_distance(distance_meters: f64) -> ProximityResult {
    ProximityResult {
        point_id: "p".to_string(),
        point_uid: Uuid::new_v4(),
        poi_id: "poi".to_string(),
        distance_meters,
    }
}

#[test]
fn test_nearest_poi_and_geodesic_distance() {
    let crs = ReferenceSystem::WebMercator;
    let index = PoiIndex::new(vec![
        poi_at("origin", 0.0, 0.0, crs),
        poi_at("faraway", 45.0, 45.0, crs),
    ]);

    // A point 0.001 deg of latitude north of the origin POI.
    let points = PointSet::from_records(vec![PointRecord::new("p1", 0.001, 0.0)], crs);

    let results = analyze(&points, &index).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].poi_id, "origin");
    // Geodesic, not planar: ~110.57 m per 0.001 deg of latitude at the
    // equator on the WGS84 ellipsoid.
    assert_relative_eq!(results[0].distance_meters, 110.57, max_relative = 0.005);
}

#[test]
fn test_geodesic_distance_is_ellipsoidal_not_planar() {
    let d = geodesic_distance(0.0, 0.0, 0.001, 0.0);
    assert_relative_eq!(d, 110.57, max_relative = 0.005);

    // One degree of longitude shrinks with latitude; planar math would not.
    let at_equator = geodesic_distance(0.0, 0.0, 0.0, 1.0);
    let at_60n = geodesic_distance(60.0, 0.0, 60.0, 1.0);
    assert!(at_60n < at_equator * 0.6);
}

#[test]
fn test_nearest_tie_resolves_to_first_poi_in_order() {
    let crs = ReferenceSystem::WebMercator;
    // Both POIs are exactly equidistant from the query point's meridian.
    let index = PoiIndex::new(vec![
        poi_at("west", 0.0, -0.01, crs),
        poi_at("east", 0.0, 0.01, crs),
    ]);

    let points = PointSet::from_records(vec![PointRecord::new("mid", 0.0, 0.0)], crs);

    let results = analyze(&points, &index).unwrap();
    assert_eq!(results[0].poi_id, "west");
}

#[test]
fn test_empty_poi_set_is_not_found() {
    let crs = ReferenceSystem::WebMercator;
    let index = PoiIndex::new(vec![]);
    let points = PointSet::from_records(vec![PointRecord::new("p1", 0.0, 0.0)], crs);

    let result = analyze(&points, &index);
    assert!(matches!(result, Err(GeospreadError::NotFound { .. })));
}

#[test]
fn test_poi_lookup_by_id() {
    let crs = ReferenceSystem::WebMercator;
    let index = PoiIndex::new(vec![poi_at("brussels", 50.85, 4.35, crs)]);

    assert_eq!(index.get("brussels").unwrap().id(), "brussels");
    assert!(matches!(
        index.get("ghent"),
        Err(GeospreadError::NotFound { .. })
    ));
}

#[test]
fn test_average_distance_is_exact_mean() {
    let results = vec![
        result_with_distance(10.0),
        result_with_distance(20.0),
        result_with_distance(60.0),
    ];
    assert_relative_eq!(average_distance(&results), 30.0, epsilon = 1e-12);
}

#[test]
fn test_average_distance_of_empty_slice_is_nan() {
    assert!(average_distance(&[]).is_nan());
}

#[test]
fn test_poi_with_empty_service_area_is_invalid() {
    use geo::{LineString, Polygon};
    let empty = Polygon::new(LineString::new(vec![]), vec![]);
    let result = Poi::new("bad", 0.0, 0.0, empty);
    assert!(matches!(
        result,
        Err(GeospreadError::InvalidGeometry { .. })
    ));
}
