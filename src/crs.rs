//! Coordinate reference system handling.
//!
//! Declustering buffers points by a radius in meters, which only makes sense
//! in a projected (planar) reference system, while the POI proximity step
//! deliberately computes geodesic distances on raw WGS84 coordinates. This
//! module provides the projected systems the pipeline supports and the
//! forward/inverse transforms between them and WGS84.
//!
//! The mixed use of a planar CRS for buffering and the ellipsoid for POI
//! distances is intentional and must not be unified.

use geo::{Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GeospreadError, Result};

/// A coordinate reference system recognized by the pipeline.
///
/// `Wgs84` is the geographic system all boundary data arrives in;
/// the other variants are projected systems suitable for buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSystem {
    /// Geographic latitude/longitude (EPSG:4326).
    Wgs84,
    /// Belgian Lambert 72 (EPSG:31370), the default working system.
    BelgianLambert72,
    /// Spherical web Mercator (EPSG:3857).
    WebMercator,
}

impl ReferenceSystem {
    /// EPSG code of this reference system.
    pub fn epsg(&self) -> u32 {
        match self {
            ReferenceSystem::Wgs84 => 4326,
            ReferenceSystem::BelgianLambert72 => 31370,
            ReferenceSystem::WebMercator => 3857,
        }
    }

    /// String identifier, e.g. `EPSG:31370`.
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg())
    }

    /// Whether coordinates under this system are planar meters.
    pub fn is_projected(&self) -> bool {
        !matches!(self, ReferenceSystem::Wgs84)
    }

    /// Project a WGS84 `(longitude, latitude)` pair into this system.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            ReferenceSystem::Wgs84 => (lon, lat),
            ReferenceSystem::BelgianLambert72 => {
                LambertConformalConic::belgian_lambert_72().forward(lon, lat)
            }
            ReferenceSystem::WebMercator => web_mercator_forward(lon, lat),
        }
    }

    /// Invert [`ReferenceSystem::project`], returning `(longitude, latitude)`.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            ReferenceSystem::Wgs84 => (x, y),
            ReferenceSystem::BelgianLambert72 => {
                LambertConformalConic::belgian_lambert_72().inverse(x, y)
            }
            ReferenceSystem::WebMercator => web_mercator_inverse(x, y),
        }
    }

    /// Project a WGS84 point into this system.
    pub fn project_point(&self, point: Point<f64>) -> Point<f64> {
        let (x, y) = self.project(point.x(), point.y());
        Point::new(x, y)
    }

    /// Project every ring coordinate of a WGS84 polygon into this system.
    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        let project_ring = |ring: &LineString<f64>| -> LineString<f64> {
            ring.coords()
                .map(|c| {
                    let (x, y) = self.project(c.x, c.y);
                    Coord { x, y }
                })
                .collect()
        };

        Polygon::new(
            project_ring(polygon.exterior()),
            polygon.interiors().iter().map(project_ring).collect(),
        )
    }
}

impl Default for ReferenceSystem {
    fn default() -> Self {
        ReferenceSystem::BelgianLambert72
    }
}

impl fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for ReferenceSystem {
    type Err = GeospreadError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s
            .trim()
            .strip_prefix("EPSG:")
            .or_else(|| s.trim().strip_prefix("epsg:"))
            .unwrap_or_else(|| s.trim());

        match code {
            "4326" => Ok(ReferenceSystem::Wgs84),
            "31370" => Ok(ReferenceSystem::BelgianLambert72),
            "3857" => Ok(ReferenceSystem::WebMercator),
            _ => Err(GeospreadError::invalid_argument(format!(
                "unrecognized reference system '{s}' (supported: EPSG:4326, EPSG:31370, EPSG:3857)"
            ))),
        }
    }
}

/// Earth radius used by the spherical web Mercator projection, meters.
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

fn web_mercator_forward(lon: f64, lat: f64) -> (f64, f64) {
    let x = WEB_MERCATOR_RADIUS * lon.to_radians();
    let y = WEB_MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
        .tan()
        .ln();
    (x, y)
}

fn web_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    (lon, lat)
}

/// Lambert Conformal Conic projection (two standard parallels, EPSG
/// method 9802) over an ellipsoid.
#[derive(Debug, Clone, Copy)]
struct LambertConformalConic {
    /// Semi-major axis of the ellipsoid, meters.
    a: f64,
    /// First eccentricity.
    e: f64,
    /// Cone constant.
    n: f64,
    /// Mapping radius factor.
    f: f64,
    /// Radius at the latitude of the false origin.
    rho0: f64,
    /// Longitude of the false origin, radians.
    lambda0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertConformalConic {
    /// Belgian Lambert 72 (EPSG:31370) on the International 1924 ellipsoid.
    fn belgian_lambert_72() -> Self {
        Self::new(
            6_378_388.0,
            297.0,
            // 49 deg 50' 00.00204" N and 51 deg 10' 00.00204" N
            49.833_333_900,
            51.166_667_233,
            // false origin: 90 deg N, 4 deg 22' 02.952" E
            90.0,
            4.367_486_666_667,
            150_000.013,
            5_400_088.438,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        a: f64,
        inverse_flattening: f64,
        phi1_deg: f64,
        phi2_deg: f64,
        phi0_deg: f64,
        lambda0_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let flattening = 1.0 / inverse_flattening;
        let e = (2.0 * flattening - flattening * flattening).sqrt();

        let phi1 = phi1_deg.to_radians();
        let phi2 = phi2_deg.to_radians();
        let phi0 = phi0_deg.to_radians();

        let m1 = Self::m(phi1, e);
        let m2 = Self::m(phi2, e);
        let t1 = Self::t(phi1, e);
        let t2 = Self::t(phi2, e);
        let t0 = Self::t(phi0, e);

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let f = m1 / (n * t1.powf(n));
        let rho0 = a * f * t0.powf(n);

        Self {
            a,
            e,
            n,
            f,
            rho0,
            lambda0: lambda0_deg.to_radians(),
            false_easting,
            false_northing,
        }
    }

    fn m(phi: f64, e: f64) -> f64 {
        phi.cos() / (1.0 - e * e * phi.sin() * phi.sin()).sqrt()
    }

    fn t(phi: f64, e: f64) -> f64 {
        let es = e * phi.sin();
        (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
    }

    fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let lambda = lon_deg.to_radians();

        let rho = self.a * self.f * Self::t(phi, self.e).powf(self.n);
        let theta = self.n * (lambda - self.lambda0);

        let easting = self.false_easting + rho * theta.sin();
        let northing = self.false_northing + self.rho0 - rho * theta.cos();
        (easting, northing)
    }

    fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let dx = easting - self.false_easting;
        let dy = self.rho0 - (northing - self.false_northing);

        let rho = (dx * dx + dy * dy).sqrt().copysign(self.n);
        let t = (rho / (self.a * self.f)).powf(1.0 / self.n);
        let theta = dx.atan2(dy);

        let lambda = theta / self.n + self.lambda0;

        // Fixed-point iteration for the conformal latitude inverse;
        // converges to well below 1e-12 rad in a handful of steps.
        let mut phi = std::f64::consts::FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..8 {
            let es = self.e * phi.sin();
            phi = std::f64::consts::FRAC_PI_2
                - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
        }

        (lambda.to_degrees(), phi.to_degrees())
    }
}
