//! Error types used by the crate.

use thiserror::Error;

/// Geoview error type.
#[derive(Debug, Error)]
pub enum GeoviewError {
    /// Network transport failure.
    #[error("failed to load data")]
    IO,
    /// The server answered with `404 Not Found`, or a local dataset file does not exist.
    #[error("dataset not found")]
    NotFound,
    /// The server answered with a non-success status other than `404`.
    #[error("unexpected response status: {0}")]
    Status(u16),
    /// Error reading a dataset from the file system.
    #[error("failed to read file")]
    FsIo(#[from] std::io::Error),
    /// The dataset body is not a valid GeoJSON document.
    #[error("failed to decode GeoJSON: {0}")]
    Decoding(#[from] geojson::Error),
    /// The dataset body is valid GeoJSON, but not a feature collection.
    #[error("document is not a feature collection")]
    NotFeatureCollection,
    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The fetch did not complete within the configured time limit.
    #[error("timed out")]
    Timeout,
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for GeoviewError {
    fn from(_value: reqwest::Error) -> Self {
        Self::IO
    }
}
