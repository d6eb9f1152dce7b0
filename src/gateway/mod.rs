//! Boundary I/O collaborators.
//!
//! Everything in this module runs at the edges of a run, never inside the
//! decluster loop: CSV point tables in and out, GeoJSON POI feature
//! collections, and the drivetime (isochrone) routing client.

pub mod csv_io;
pub mod drivetime;
pub mod geojson_io;

pub use csv_io::{read_points, write_points};
pub use drivetime::DrivetimeClient;
pub use geojson_io::{read_poi_dir, read_poi_feature_collection, write_feature_collection};
