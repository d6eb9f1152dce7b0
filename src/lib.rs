//! # geospread
//!
//! Spatial point declustering and POI proximity analysis.
//!
//! This library provides:
//! - Iterative buffer-union-and-prune declustering so that no two surviving
//!   points lie within a configurable radius of each other
//! - Cluster zone partitioning (buffer every point, union, split into
//!   connected components)
//! - Nearest-POI lookup via an R-tree over drivetime service-area centroids
//! - Geodesic (ellipsoidal) point-to-POI distances and summary statistics
//! - A data gateway for CSV point tables, GeoJSON POI collections and an
//!   OpenRouteService drivetime client
//!
//! ## Features
//!
//! - **`parallel`** - Per-zone prune selection with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use geospread::{PointRecord, PointSet, ReferenceSystem};
//! use geospread::decluster::{decluster, DeclusterConfig};
//!
//! let records = vec![
//!     PointRecord::new("a", 50.8500, 4.3500),
//!     PointRecord::new("b", 50.8501, 4.3501), // ~13 m from "a"
//!     PointRecord::new("c", 51.2100, 4.4000),
//! ];
//!
//! let points = PointSet::from_records(records, ReferenceSystem::BelgianLambert72);
//!
//! let config = DeclusterConfig {
//!     radius_meters: 100.0,
//!     ..DeclusterConfig::default()
//! };
//! let spread = decluster(&points, &config).unwrap();
//!
//! // "a" and "b" share a cluster zone, so one of them is pruned.
//! assert_eq!(spread.len(), 2);
//! ```

use geo::{Intersects, Point, Polygon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Unified error handling
pub mod error;
pub use error::{GeospreadError, OptionExt, Result};

// Coordinate reference systems and reprojection
pub mod crs;
pub use crs::ReferenceSystem;

// Cluster zone partitioning (buffer, union, connected components)
pub mod partition;
pub use partition::{partition, ClusterZone};

// Iterative declustering (the core algorithm)
pub mod decluster;
pub use decluster::{decluster, DeclusterConfig};

// Nearest-POI lookup and geodesic distances
pub mod proximity;
pub use proximity::{
    analyze, average_distance, geodesic_distance, Poi, PoiIndex, ProximityResult,
};

// Boundary I/O: CSV point tables, GeoJSON POI collections, drivetime client
pub mod gateway;

// End-to-end pipeline driver
pub mod pipeline;
pub use pipeline::{AnalysisPipeline, AnalysisReport, PipelineConfig};

/// A raw point record as it appears at the data boundary.
///
/// Coordinates are geographic WGS84. A missing `uid` is generated when the
/// record enters a [`PointSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    /// Source identifier, stable across runs.
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Generated unique id, carried through if already present.
    #[serde(default, rename = "uuid", skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
}

impl PointRecord {
    /// Create a record from an id and WGS84 coordinates.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            uid: None,
        }
    }
}

/// A point under a projected reference system, together with its identity
/// and the raw geographic coordinate it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SitePoint {
    id: String,
    uid: Uuid,
    latitude: f64,
    longitude: f64,
    geometry: Point<f64>,
}

impl SitePoint {
    /// Source identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Generated unique id.
    pub fn uid(&self) -> Uuid {
        self.uid
    }

    /// Raw WGS84 latitude.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Raw WGS84 longitude.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Planar geometry under the owning set's reference system.
    pub fn geometry(&self) -> Point<f64> {
        self.geometry
    }

    /// Both planar coordinates are finite. Checked on entry to every
    /// operation rather than at construction.
    pub fn has_valid_geometry(&self) -> bool {
        self.geometry.x().is_finite() && self.geometry.y().is_finite()
    }
}

/// An ordered collection of points sharing one reference system.
///
/// A `PointSet` exclusively owns its points for the duration of a decluster
/// run. Iterations never mutate a set in place; each produces a new,
/// smaller set.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<SitePoint>,
    crs: ReferenceSystem,
}

impl PointSet {
    /// Build a set from boundary records, projecting each WGS84 coordinate
    /// into `crs` and generating unique ids where missing.
    pub fn from_records(records: Vec<PointRecord>, crs: ReferenceSystem) -> Self {
        let points = records
            .into_iter()
            .map(|record| {
                let (x, y) = crs.project(record.longitude, record.latitude);
                SitePoint {
                    id: record.id,
                    uid: record.uid.unwrap_or_else(Uuid::new_v4),
                    latitude: record.latitude,
                    longitude: record.longitude,
                    geometry: Point::new(x, y),
                }
            })
            .collect();

        Self { points, crs }
    }

    /// Build a set directly from planar coordinates already expressed in
    /// `crs`. The geographic coordinate is recovered by inverse projection.
    pub fn from_projected(records: Vec<(String, f64, f64)>, crs: ReferenceSystem) -> Self {
        let points = records
            .into_iter()
            .map(|(id, x, y)| {
                let (longitude, latitude) = crs.unproject(x, y);
                SitePoint {
                    id,
                    uid: Uuid::new_v4(),
                    latitude,
                    longitude,
                    geometry: Point::new(x, y),
                }
            })
            .collect();

        Self { points, crs }
    }

    /// Rebuild a set from already-projected points. Used by the decluster
    /// loop to construct each iteration's survivor set.
    pub(crate) fn from_parts(points: Vec<SitePoint>, crs: ReferenceSystem) -> Self {
        Self { points, crs }
    }

    /// The reference system all geometries are expressed in.
    pub fn crs(&self) -> ReferenceSystem {
        self.crs
    }

    /// Points in input order.
    pub fn points(&self) -> &[SitePoint] {
        &self.points
    }

    /// Number of points in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate points in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, SitePoint> {
        self.points.iter()
    }

    /// Fail with [`GeospreadError::InvalidGeometry`] if any point geometry
    /// is empty or non-finite. Every operation calls this on entry.
    pub fn validate_geometries(&self) -> Result<()> {
        for point in &self.points {
            if !point.has_valid_geometry() {
                return Err(GeospreadError::invalid_geometry(
                    point.id.clone(),
                    "point geometry has non-finite coordinates",
                ));
            }
        }
        Ok(())
    }

    /// Points lying within or touching `polygon` (boundary-inclusive),
    /// in input order. The polygon must be expressed in this set's CRS.
    pub fn points_in_polygon(&self, polygon: &Polygon<f64>) -> Result<PointSet> {
        self.validate_geometries()?;

        let points = self
            .points
            .iter()
            .filter(|p| p.geometry.intersects(polygon))
            .cloned()
            .collect();

        Ok(Self {
            points,
            crs: self.crs,
        })
    }
}
