//! Drivetime (isochrone) routing client.
//!
//! Thin blocking client for the OpenRouteService isochrone endpoint. The
//! service computes the drivetime polygons; this crate only fetches and
//! stores them. Called at the pipeline boundary only, never inside the
//! decluster loop.

use geojson::{FeatureCollection, GeoJson};
use log::info;
use serde_json::json;

use crate::error::{GeospreadError, Result};

/// Default OpenRouteService API root.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Blocking OpenRouteService isochrone client.
#[derive(Debug)]
pub struct DrivetimeClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl DrivetimeClient {
    /// Client against the public OpenRouteService API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a custom service root (self-hosted instance, tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the drivetime polygon reachable from a POI within
    /// `range_seconds` of driving, as a GeoJSON FeatureCollection in WGS84.
    ///
    /// The POI's `id`, `latitude` and `longitude` are stamped into the
    /// returned feature's properties so the collection can be re-read as a
    /// POI later.
    pub fn fetch_isochrone(
        &self,
        poi_id: &str,
        latitude: f64,
        longitude: f64,
        range_seconds: u32,
    ) -> Result<FeatureCollection> {
        info!("fetching {range_seconds}s isochrone for POI '{poi_id}'");

        let response = self
            .http
            .post(format!("{}/v2/isochrones/driving-car", self.base_url))
            .header("Authorization", &self.api_key)
            .json(&json!({
                "locations": [[longitude, latitude]],
                "range": [range_seconds],
            }))
            .send()?
            .error_for_status()?;

        let geojson: GeoJson = response.json()?;
        let mut collection = FeatureCollection::try_from(geojson)?;

        let feature = collection.features.first_mut().ok_or_else(|| {
            GeospreadError::invalid_argument(format!(
                "drivetime service returned no features for POI '{poi_id}'"
            ))
        })?;
        feature.set_property("id", poi_id);
        feature.set_property("latitude", latitude);
        feature.set_property("longitude", longitude);

        Ok(collection)
    }
}
