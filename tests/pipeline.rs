//! Tests for the end-to-end analysis pipeline

use std::fs;
use std::path::PathBuf;

use geospread::decluster::DeclusterConfig;
use geospread::{AnalysisPipeline, PipelineConfig, ReferenceSystem};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("geospread-{name}-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const POI_COLLECTION: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "id": "brussels", "latitude": 50.8503, "longitude": 4.3517 },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[4.30, 50.80], [4.40, 50.80], [4.40, 50.90], [4.30, 50.90], [4.30, 50.80]]]
      }
    }
  ]
}"#;

#[test]
fn test_full_run_declusters_and_reports_mean_distance() {
    let dir = scratch_dir("pipeline");
    let points_path = dir.join("points.csv");
    let poi_dir = dir.join("geojson");
    fs::create_dir_all(&poi_dir).unwrap();

    // "a" and "b" are ~13 m apart and share a 100 m cluster zone;
    // "c" sits ~40 km away in Antwerp.
    fs::write(
        &points_path,
        "id,latitude,longitude\na,50.8500,4.3500\nb,50.8501,4.3501\nc,51.2100,4.4000\n",
    )
    .unwrap();
    fs::write(poi_dir.join("brussels.geojson"), POI_COLLECTION).unwrap();

    let pipeline = AnalysisPipeline::new(PipelineConfig {
        points_path,
        poi_dir,
        crs: ReferenceSystem::BelgianLambert72,
        decluster: DeclusterConfig {
            radius_meters: 100.0,
            ..DeclusterConfig::default()
        },
    });

    let report = pipeline.run().unwrap();

    assert_eq!(report.input_count, 3);
    assert_eq!(report.surviving_count, 2);
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.poi_id == "brussels"));

    // Both survivors are within ~45 km of the only POI.
    let mean = report.mean_distance_meters.unwrap();
    assert!(mean > 0.0 && mean < 50_000.0, "mean: {mean}");
}

#[test]
fn test_missing_poi_directory_fails() {
    let dir = scratch_dir("pipeline-no-poi");
    let points_path = dir.join("points.csv");
    fs::write(&points_path, "id,latitude,longitude\na,50.85,4.35\n").unwrap();

    let pipeline = AnalysisPipeline::new(PipelineConfig {
        points_path,
        poi_dir: dir.join("does-not-exist"),
        crs: ReferenceSystem::BelgianLambert72,
        decluster: DeclusterConfig::default(),
    });

    assert!(pipeline.run().is_err());
}
