//! Unified error type for the vidserve application.
//!
//! All modules funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in vidserve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied asset identifier is not a valid id.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The `Range` header could not be parsed as a single byte range.
    #[error("Malformed range: {0}")]
    MalformedRange(String),

    /// The requested entity could not be found (or is not published).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The requested range starts at or beyond the end of the asset.
    #[error("Range start {start} is beyond asset length {total_length}")]
    RangeNotSatisfiable {
        /// First requested byte offset.
        start: u64,
        /// Known total length of the asset.
        total_length: u64,
    },

    /// The external transform failed before producing any output.
    #[error("Transform error: {message}")]
    Transform {
        /// Human-readable failure description.
        message: String,
    },

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request or configuration data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidIdentifier(_) => 400,
            Error::MalformedRange(_) => 400,
            Error::NotFound { .. } => 404,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::Transform { .. } => 502,
            Error::Unauthorized(_) => 401,
            Error::Validation(_) => 400,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Transform`].
    pub fn transform(message: impl Into<String>) -> Self {
        Error::Transform {
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", "abc-123");
        assert_eq!(err.to_string(), "video not found: abc-123");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn range_not_satisfiable_maps_to_416() {
        let err = Error::RangeNotSatisfiable {
            start: 6_000_000,
            total_length: 5_000_000,
        };
        assert_eq!(err.http_status(), 416);
        assert!(err.to_string().contains("6000000"));
    }

    #[test]
    fn transform_maps_to_502() {
        let err = Error::transform("ffmpeg exited early");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn malformed_range_maps_to_400() {
        assert_eq!(Error::MalformedRange("bad".into()).http_status(), 400);
        assert_eq!(Error::InvalidIdentifier("x".into()).http_status(), 400);
    }
}
