//! End-to-end analysis pipeline.
//!
//! Explicit replacement for a script-style driver: all configuration
//! (input source, radius, reference system, POI source) is passed in, no
//! process-wide state, and I/O happens only at the boundaries.

use std::path::PathBuf;

use log::info;

use crate::decluster::{decluster, DeclusterConfig};
use crate::error::Result;
use crate::gateway::{csv_io, geojson_io};
use crate::proximity::{analyze, average_distance, PoiIndex, ProximityResult};
use crate::{PointSet, ReferenceSystem};

/// Everything a full analysis run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// CSV point table (`id, latitude, longitude[, uuid]`).
    pub points_path: PathBuf,
    /// Directory of per-POI `.geojson` service-area collections.
    pub poi_dir: PathBuf,
    /// Working projected reference system for buffering and zone geometry.
    pub crs: ReferenceSystem,
    /// Decluster parameters.
    pub decluster: DeclusterConfig,
}

/// Outcome of a pipeline run.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Point count before declustering.
    pub input_count: usize,
    /// Point count after declustering.
    pub surviving_count: usize,
    /// The declustered point set.
    pub points: PointSet,
    /// Per-point nearest-POI results, in point order.
    pub results: Vec<ProximityResult>,
    /// Mean geodesic distance to the nearest POI; `None` for an empty
    /// surviving set.
    pub mean_distance_meters: Option<f64>,
}

/// Batch pipeline: read points → decluster → nearest-POI analysis.
#[derive(Debug)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full analysis.
    pub fn run(&self) -> Result<AnalysisReport> {
        let points = csv_io::read_points(&self.config.points_path, self.config.crs)?;
        let input_count = points.len();
        info!(
            "loaded {} points from {}",
            input_count,
            self.config.points_path.display()
        );

        let pois = geojson_io::read_poi_dir(&self.config.poi_dir, self.config.crs)?;
        info!("loaded {} POIs from {}", pois.len(), self.config.poi_dir.display());
        let index = PoiIndex::new(pois);

        let survivors = decluster(&points, &self.config.decluster)?;
        info!(
            "declustered {} points down to {} at radius {} m",
            input_count,
            survivors.len(),
            self.config.decluster.radius_meters
        );

        let results = analyze(&survivors, &index)?;
        let mean_distance_meters = if results.is_empty() {
            None
        } else {
            Some(average_distance(&results))
        };

        Ok(AnalysisReport {
            input_count,
            surviving_count: survivors.len(),
            points: survivors,
            results,
            mean_distance_meters,
        })
    }
}
