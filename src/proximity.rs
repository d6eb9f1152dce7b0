//! Nearest-POI lookup and geodesic distances.
//!
//! Each POI is represented by a drivetime-derived service area; only its
//! centroid and id matter for proximity. Nearest-POI queries run against an
//! R-tree of projected centroids under the working (planar) reference
//! system, while the reported point-to-POI distance is geodesic on the
//! WGS84 ellipsoid. The two reference systems are intentionally different:
//! the planar CRS keeps buffering accurate, the ellipsoid keeps distances
//! accurate at the ranges involved.

use geo::{Centroid, Distance, Geodesic, Point, Polygon};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GeospreadError, OptionExt, Result};
use crate::{PointSet, SitePoint};

/// Relative distance-squared slack for treating two R-tree candidates as
/// ties; absorbs floating-point noise in centroid computation.
const TIE_EPSILON: f64 = 1e-9;

/// A point of interest with its drivetime service area.
#[derive(Debug, Clone)]
pub struct Poi {
    id: String,
    latitude: f64,
    longitude: f64,
    service_area: Polygon<f64>,
    centroid: Point<f64>,
}

impl Poi {
    /// Build a POI from its id, raw WGS84 coordinate and service-area
    /// polygon expressed in the working (projected) reference system.
    ///
    /// The representative centroid is derived from the service area.
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        service_area: Polygon<f64>,
    ) -> Result<Self> {
        let id = id.into();
        let centroid = service_area.centroid().ok_or_else(|| {
            GeospreadError::invalid_geometry(id.clone(), "service area polygon is empty")
        })?;
        if !centroid.x().is_finite() || !centroid.y().is_finite() {
            return Err(GeospreadError::invalid_geometry(
                id,
                "service area centroid has non-finite coordinates",
            ));
        }

        Ok(Self {
            id,
            latitude,
            longitude,
            service_area,
            centroid,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw WGS84 latitude of the POI itself.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Raw WGS84 longitude of the POI itself.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Drivetime service area in the working reference system.
    pub fn service_area(&self) -> &Polygon<f64> {
        &self.service_area
    }

    /// Representative point used for nearest-POI queries.
    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }
}

/// Per-point record of the nearest POI and the geodesic distance to it.
/// Derived, read-only once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityResult {
    pub point_id: String,
    pub point_uid: Uuid,
    pub poi_id: String,
    /// Geodesic (ellipsoidal) distance, meters.
    pub distance_meters: f64,
}

/// Spatial index over POI service-area centroids for nearest-POI queries.
#[derive(Debug)]
pub struct PoiIndex {
    pois: Vec<Poi>,
    tree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl PoiIndex {
    /// Bulk-load an index over the given POIs.
    pub fn new(pois: Vec<Poi>) -> Self {
        let entries = pois
            .iter()
            .enumerate()
            .map(|(index, poi)| {
                GeomWithData::new([poi.centroid.x(), poi.centroid.y()], index)
            })
            .collect();

        Self {
            pois,
            tree: RTree::bulk_load(entries),
        }
    }

    /// POIs in insertion order.
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Look up a POI by id.
    pub fn get(&self, id: &str) -> Result<&Poi> {
        self.pois
            .iter()
            .find(|poi| poi.id == id)
            .ok_or_not_found("POI", id)
    }

    /// The POI whose centroid is nearest to `point` under the working
    /// reference system. Exact distance ties resolve to the first POI in
    /// insertion order.
    ///
    /// # Errors
    /// [`GeospreadError::NotFound`] if the index is empty.
    pub fn nearest(&self, point: &SitePoint) -> Result<&Poi> {
        let query = [point.geometry().x(), point.geometry().y()];

        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_distance2) = candidates.next().ok_or_not_found("POI", "<empty POI set>")?;

        // The R-tree does not define an order among exact ties, so walk the
        // tied frontier and keep the lowest insertion index.
        let slack = TIE_EPSILON * best_distance2.max(1.0);
        let mut best = first.data;
        for (entry, distance2) in candidates {
            if distance2 > best_distance2 + slack {
                break;
            }
            if entry.data < best {
                best = entry.data;
            }
        }

        Ok(&self.pois[best])
    }
}

/// Geodesic distance in meters between two WGS84 coordinates, on the
/// ellipsoid rather than in the projected plane.
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic.distance(Point::new(lon1, lat1), Point::new(lon2, lat2))
}

/// For every point, find its nearest POI and the geodesic distance to it.
///
/// The nearest-POI query uses projected centroids; the reported distance is
/// computed from the raw WGS84 coordinates of the point and the POI.
pub fn analyze(points: &PointSet, index: &PoiIndex) -> Result<Vec<ProximityResult>> {
    points.validate_geometries()?;

    points
        .iter()
        .map(|point| {
            let poi = index.nearest(point)?;
            Ok(ProximityResult {
                point_id: point.id().to_string(),
                point_uid: point.uid(),
                poi_id: poi.id.clone(),
                distance_meters: geodesic_distance(
                    point.latitude(),
                    point.longitude(),
                    poi.latitude,
                    poi.longitude,
                ),
            })
        })
        .collect()
}

/// Arithmetic mean of the recorded distances.
///
/// Returns NaN for an empty slice; callers must check emptiness first.
pub fn average_distance(results: &[ProximityResult]) -> f64 {
    let total: f64 = results.iter().map(|r| r.distance_meters).sum();
    total / results.len() as f64
}
