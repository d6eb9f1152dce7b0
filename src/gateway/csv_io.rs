//! CSV point-table reader and writer.
//!
//! The input table must carry `id`, `latitude` and `longitude` columns; an
//! optional `uuid` column is carried through and generated when absent.

use std::path::Path;

use crate::error::{GeospreadError, Result};
use crate::{PointRecord, PointSet, ReferenceSystem};

/// Columns every point table must provide.
const REQUIRED_COLUMNS: [&str; 3] = ["id", "latitude", "longitude"];

/// Read a point table from `path` and project it into `crs`.
///
/// # Errors
/// [`GeospreadError::InvalidArgument`] if the header is missing a required
/// column, naming the columns actually received.
pub fn read_points(path: impl AsRef<Path>, crs: ReferenceSystem) -> Result<PointSet> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .copied()
        .collect();
    if !missing.is_empty() {
        let received: Vec<&str> = headers.iter().collect();
        return Err(GeospreadError::invalid_argument(format!(
            "wrong column names, columns should be called id, latitude, longitude; received {}",
            received.join(",")
        )));
    }

    let records = reader
        .deserialize::<PointRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(PointSet::from_records(records, crs))
}

/// Write a point set back out as a CSV table with a `uuid` column.
pub fn write_points(path: impl AsRef<Path>, points: &PointSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    writer.write_record(["id", "latitude", "longitude", "uuid"])?;
    for point in points.iter() {
        writer.write_record([
            point.id().to_string(),
            point.latitude().to_string(),
            point.longitude().to_string(),
            point.uid().to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}
