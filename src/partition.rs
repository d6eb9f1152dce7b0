//! Cluster zone partitioning.
//!
//! Buffers every point of a set by a radius, unions the buffers and splits
//! the union into disjoint connected components ("cluster zones"). Every
//! input point lies within exactly one zone; lying exactly on a zone
//! boundary counts as membership.

use geo::{unary_union, Centroid, Intersects, LineString, Point, Polygon};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{GeospreadError, Result};
use crate::PointSet;

/// One connected component of the union of all point buffers at a given
/// radius, together with the indices of the points it owns.
///
/// Zones are never mutated: the decluster loop rebuilds the partition from
/// scratch each iteration because membership changes whenever a point is
/// removed.
#[derive(Debug, Clone)]
pub struct ClusterZone {
    /// Freshly generated opaque zone id.
    pub id: Uuid,
    /// The component polygon, in the point set's reference system.
    pub polygon: Polygon<f64>,
    /// Centroid of the component polygon.
    pub centroid: Point<f64>,
    /// Indices into the partitioned [`PointSet`], in input order.
    pub members: Vec<usize>,
}

/// Approximate a circle of `radius` around `center` as a closed polygon
/// with `segments` vertices.
pub fn buffer_point(center: Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(4);
    let (cx, cy) = (center.x(), center.y());

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        coords.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Partition a point set into disjoint cluster zones at the given radius.
///
/// Pure function of its inputs: buffers every point by `radius` (meters, in
/// the set's projected reference system), unions all buffers, decomposes the
/// union into connected components and assigns each point to its containing
/// component.
///
/// # Errors
/// - [`GeospreadError::InvalidArgument`] for a negative or non-finite
///   radius, `segments < 4`, or a geographic (unprojected) point-set CRS
/// - [`GeospreadError::InvalidGeometry`] if any point geometry is invalid
/// - [`GeospreadError::InvariantViolation`] if a point matches no zone,
///   which signals a geometry-library or floating-point edge case
pub fn partition(points: &PointSet, radius: f64, segments: usize) -> Result<Vec<ClusterZone>> {
    validate_arguments(points, radius, segments)?;
    points.validate_geometries()?;

    if points.is_empty() {
        return Ok(vec![]);
    }

    if radius == 0.0 {
        return Ok(partition_coincident(points));
    }

    let buffers: Vec<Polygon<f64>> = points
        .iter()
        .map(|p| buffer_point(p.geometry(), radius, segments))
        .collect();

    // Dissolve all buffers and explode the result into its parts.
    let dissolved = unary_union(buffers.iter());

    let mut zones: Vec<ClusterZone> = dissolved
        .into_iter()
        .map(|polygon| {
            let centroid = polygon.centroid().ok_or_else(|| {
                GeospreadError::invariant("buffer union produced an empty component")
            })?;
            Ok(ClusterZone {
                id: Uuid::new_v4(),
                polygon,
                centroid,
                members: Vec::new(),
            })
        })
        .collect::<Result<_>>()?;

    // Boundary-touching counts as inclusion, hence Intersects rather than
    // Contains. Components are disjoint, so the first match is the only one.
    for (index, point) in points.iter().enumerate() {
        let zone = zones
            .iter_mut()
            .find(|z| point.geometry().intersects(&z.polygon))
            .ok_or_else(|| {
                GeospreadError::invariant(format!(
                    "point '{}' lies in no cluster zone after partitioning",
                    point.id()
                ))
            })?;
        zone.members.push(index);
    }

    Ok(zones)
}

/// Argument checks shared with the decluster loop, so bad configuration is
/// rejected uniformly regardless of input size.
pub(crate) fn validate_arguments(
    points: &PointSet,
    radius: f64,
    segments: usize,
) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeospreadError::invalid_argument(format!(
            "buffer radius must be a non-negative number, got {radius}"
        )));
    }
    if segments < 4 {
        return Err(GeospreadError::invalid_argument(format!(
            "buffer segment count must be at least 4, got {segments}"
        )));
    }
    if !points.crs().is_projected() {
        return Err(GeospreadError::invalid_argument(format!(
            "buffer radius is in meters; {} is not a projected reference system",
            points.crs()
        )));
    }
    Ok(())
}

/// Zero-radius partition: buffers degenerate to the points themselves, so
/// zones are built by exact coordinate grouping, one zone per distinct
/// coordinate, in first-occurrence order.
fn partition_coincident(points: &PointSet) -> Vec<ClusterZone> {
    let mut zone_of: HashMap<(u64, u64), usize> = HashMap::new();
    let mut zones: Vec<ClusterZone> = Vec::new();

    for (index, point) in points.iter().enumerate() {
        let geometry = point.geometry();
        let key = (geometry.x().to_bits(), geometry.y().to_bits());

        let zone_index = *zone_of.entry(key).or_insert_with(|| {
            let coord = geometry.0;
            zones.push(ClusterZone {
                id: Uuid::new_v4(),
                // Degenerate zero-width ring at the shared coordinate.
                polygon: Polygon::new(LineString::from(vec![coord, coord, coord, coord]), vec![]),
                centroid: geometry,
                members: Vec::new(),
            });
            zones.len() - 1
        });

        zones[zone_index].members.push(index);
    }

    zones
}
