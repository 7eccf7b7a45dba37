//! Error type shared by every stage of field synthesis.

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating inputs or exporting a field.
///
/// Validation is eager: synthesis either returns a complete field or fails
/// with one of these before any sample is computed.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid numeric range, duplicate region name or degenerate geometry.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Icosahedral level (or the level implied by a resolution) is outside
    /// the supported range.
    #[error("unsupported icosahedral level: {0}")]
    UnsupportedLevel(String),

    /// Malformed polygon: too few vertices or a self-intersecting boundary.
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        Error::Geometry(msg.into())
    }
}
