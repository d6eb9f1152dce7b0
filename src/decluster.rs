//! Iterative spatial declustering.
//!
//! The core algorithm of the crate: repeatedly partition the point set into
//! cluster zones, delete the most central redundant point of every
//! over-populated zone, and stop once an iteration deletes nothing. The
//! surviving set has no two points closer than the radius, and within each
//! local cluster the point farthest from the cluster centroid is preferred.
//!
//! Each iteration builds a fresh partition and a fresh survivor set; nothing
//! is mutated across iterations, so the input set is never changed.

use geo::{Distance, Euclidean};
use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{GeospreadError, Result};
use crate::partition::{partition, validate_arguments, ClusterZone};
use crate::PointSet;

/// Configuration for a decluster run.
#[derive(Debug, Clone)]
pub struct DeclusterConfig {
    /// Minimum spacing between surviving points, meters.
    pub radius_meters: f64,
    /// Vertex count for the circle approximation of each point buffer.
    pub buffer_segments: usize,
    /// Defensive cap on loop iterations. The loop provably removes at least
    /// one point per iteration until it converges, so hitting the cap means
    /// a geometry edge case broke that guarantee and the run is aborted.
    pub max_iterations: usize,
}

impl Default for DeclusterConfig {
    fn default() -> Self {
        Self {
            radius_meters: 100.0,
            buffer_segments: 16,
            max_iterations: 1000,
        }
    }
}

/// Reduce spatial clustering in `points` until no two surviving points lie
/// within `config.radius_meters` of each other.
///
/// Per iteration: partition the current survivors into cluster zones, and in
/// every zone holding more than one point delete the member closest to the
/// zone's polygon centroid (ties broken by first occurrence in input order).
/// Converges when a full iteration deletes nothing, i.e. every zone holds
/// exactly one point.
///
/// The input set is never mutated; the result is a new set whose points keep
/// their input order. An empty or single-point input is returned unchanged.
///
/// # Errors
/// - [`GeospreadError::InvalidArgument`] for a bad radius or an unprojected
///   point-set CRS
/// - [`GeospreadError::InvalidGeometry`] if any input geometry is invalid;
///   raised before any pruning occurs and never retried
/// - [`GeospreadError::InvariantViolation`] if a point matches no zone or
///   the iteration cap is exhausted
pub fn decluster(points: &PointSet, config: &DeclusterConfig) -> Result<PointSet> {
    points.validate_geometries()?;
    // Checked here as well as in partition: the small-input early return
    // must not let a bad radius or an unprojected CRS pass as Ok.
    validate_arguments(points, config.radius_meters, config.buffer_segments)?;

    if points.len() <= 1 {
        return Ok(points.clone());
    }

    let crs = points.crs();
    let mut survivors = points.clone();

    for iteration in 0..config.max_iterations {
        let zones = partition(&survivors, config.radius_meters, config.buffer_segments)?;

        let doomed = select_prunable(&zones, &survivors);

        debug!(
            "decluster iteration {}: {} points, {} zones, {} deletions",
            iteration,
            survivors.len(),
            zones.len(),
            doomed.len()
        );

        // Zero deletions means every zone holds exactly one point.
        if doomed.is_empty() {
            return Ok(survivors);
        }

        let kept = survivors
            .iter()
            .enumerate()
            .filter(|(index, _)| !doomed.contains(index))
            .map(|(_, point)| point.clone())
            .collect();
        survivors = PointSet::from_parts(kept, crs);
    }

    Err(GeospreadError::invariant(format!(
        "decluster did not converge within {} iterations",
        config.max_iterations
    )))
}

/// For every zone with more than one member, pick the member to delete:
/// the one closest to the zone centroid, earliest input position on ties.
///
/// Zones are disjoint, so the per-zone selections are independent; with the
/// `parallel` feature they run under rayon with identical results.
fn select_prunable(zones: &[ClusterZone], points: &PointSet) -> Vec<usize> {
    let closest_member = |zone: &ClusterZone| -> Option<usize> {
        if zone.members.len() < 2 {
            return None;
        }

        let mut closest = zone.members[0];
        let mut closest_distance =
            Euclidean.distance(points.points()[closest].geometry(), zone.centroid);

        // Strict less-than keeps the first occurrence on exact ties.
        for &member in &zone.members[1..] {
            let distance =
                Euclidean.distance(points.points()[member].geometry(), zone.centroid);
            if distance < closest_distance {
                closest = member;
                closest_distance = distance;
            }
        }

        Some(closest)
    };

    #[cfg(feature = "parallel")]
    let doomed: Vec<usize> = zones.par_iter().filter_map(closest_member).collect();

    #[cfg(not(feature = "parallel"))]
    let doomed: Vec<usize> = zones.iter().filter_map(closest_member).collect();

    doomed
}
