//! Unified error handling for the geospread library.
//!
//! All fallible operations return [`Result`]. Errors are raised at the point
//! of detection and never caught or retried internally: a failed decluster
//! run produces no output rather than a partially pruned set, and the caller
//! decides whether to clean the input and re-run.

use thiserror::Error;

/// Result type alias using [`GeospreadError`].
pub type Result<T> = std::result::Result<T, GeospreadError>;

/// Errors that can occur during declustering and proximity analysis.
#[derive(Error, Debug)]
pub enum GeospreadError {
    /// A caller-supplied argument was out of range or malformed
    /// (negative radius, unrecognized reference system, wrong CSV columns).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A geometry in the input was empty or otherwise invalid. The run is
    /// aborted before any pruning occurs; the input must be cleaned first.
    #[error("invalid geometry for '{id}': {reason}")]
    InvalidGeometry { id: String, reason: String },

    /// An internal invariant was violated, e.g. a point matched no cluster
    /// zone after partitioning. This signals a geometry-library or
    /// floating-point edge case and must never pass silently.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// A record lookup by id found nothing.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// CSV parsing or writing failed at the data gateway.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// GeoJSON parsing or serialization failed at the data gateway.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Filesystem I/O failed at the data gateway.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The drivetime routing service returned an error.
    #[error("drivetime service error: {0}")]
    Drivetime(#[from] reqwest::Error),
}

impl GeospreadError {
    /// Shorthand for a [`GeospreadError::InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GeospreadError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for a [`GeospreadError::InvalidGeometry`] error.
    pub fn invalid_geometry(id: impl Into<String>, reason: impl Into<String>) -> Self {
        GeospreadError::InvalidGeometry {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`GeospreadError::InvariantViolation`] error.
    pub fn invariant(message: impl Into<String>) -> Self {
        GeospreadError::InvariantViolation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`GeospreadError::NotFound`] error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        GeospreadError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Extension trait for converting `Option` into lookup errors.
pub trait OptionExt<T> {
    /// Convert `None` into a [`GeospreadError::NotFound`].
    fn ok_or_not_found(self, kind: &'static str, id: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, kind: &'static str, id: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| GeospreadError::not_found(kind, id))
    }
}
