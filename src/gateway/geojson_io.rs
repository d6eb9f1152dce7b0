//! GeoJSON POI feature-collection reader and writer.
//!
//! POI service areas arrive as one FeatureCollection per `.geojson` file,
//! each feature carrying a polygon geometry in WGS84 plus `id`, `latitude`
//! and `longitude` properties.

use std::fs;
use std::path::Path;

use geo::Polygon;
use geojson::{FeatureCollection, GeoJson};

use crate::error::{GeospreadError, Result};
use crate::proximity::Poi;
use crate::ReferenceSystem;

/// Read every `.geojson` FeatureCollection in `dir` and collect the POIs,
/// reprojecting service areas from WGS84 into `crs`.
///
/// Files are visited in lexical order so POI insertion order (and thus
/// nearest-POI tie-breaking) is stable across runs.
///
/// # Errors
/// [`GeospreadError::NotFound`] if the directory holds no `.geojson` files.
pub fn read_poi_dir(dir: impl AsRef<Path>, crs: ReferenceSystem) -> Result<Vec<Poi>> {
    let dir = dir.as_ref();

    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "geojson"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(GeospreadError::not_found(
            "geojson files in directory",
            dir.display().to_string(),
        ));
    }

    let mut pois = Vec::new();
    for path in files {
        let raw = fs::read_to_string(&path)?;
        let geojson: GeoJson = raw.parse()?;
        let collection = FeatureCollection::try_from(geojson)?;
        pois.extend(read_poi_feature_collection(&collection, crs)?);
    }

    Ok(pois)
}

/// Extract POIs from a single FeatureCollection.
pub fn read_poi_feature_collection(
    collection: &FeatureCollection,
    crs: ReferenceSystem,
) -> Result<Vec<Poi>> {
    collection
        .features
        .iter()
        .map(|feature| {
            let id = property_string(feature, "id")?;
            let latitude = property_f64(feature, "latitude", &id)?;
            let longitude = property_f64(feature, "longitude", &id)?;

            let geometry = feature.geometry.as_ref().ok_or_else(|| {
                GeospreadError::invalid_geometry(id.clone(), "feature has no geometry")
            })?;
            let polygon = polygon_from_geometry(geometry, &id)?;

            Poi::new(id, latitude, longitude, crs.project_polygon(&polygon))
        })
        .collect()
}

/// Persist a FeatureCollection (e.g. a fetched isochrone) to `path`.
pub fn write_feature_collection(
    path: impl AsRef<Path>,
    collection: FeatureCollection,
) -> Result<()> {
    fs::write(path.as_ref(), GeoJson::FeatureCollection(collection).to_string())?;
    Ok(())
}

/// WGS84 polygon from a feature geometry; a MultiPolygon contributes its
/// first part, matching how single-range isochrones are delivered.
fn polygon_from_geometry(geometry: &geojson::Geometry, id: &str) -> Result<Polygon<f64>> {
    match &geometry.value {
        value @ geojson::Value::Polygon(_) => Ok(Polygon::try_from(value.clone())?),
        geojson::Value::MultiPolygon(parts) => {
            let first = parts.first().ok_or_else(|| {
                GeospreadError::invalid_geometry(id, "empty MultiPolygon geometry")
            })?;
            Ok(Polygon::try_from(geojson::Value::Polygon(first.clone()))?)
        }
        other => Err(GeospreadError::invalid_geometry(
            id,
            format!("expected a polygonal geometry, got {}", other.type_name()),
        )),
    }
}

fn property_string(feature: &geojson::Feature, key: &str) -> Result<String> {
    let value = feature.property(key).ok_or_else(|| {
        GeospreadError::invalid_argument(format!("POI feature is missing the '{key}' property"))
    })?;

    Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn property_f64(feature: &geojson::Feature, key: &str, id: &str) -> Result<f64> {
    feature
        .property(key)
        .and_then(|value| value.as_f64())
        .ok_or_else(|| {
            GeospreadError::invalid_argument(format!(
                "POI '{id}' is missing a numeric '{key}' property"
            ))
        })
}
