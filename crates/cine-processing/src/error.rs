//! Error types for data collection, preprocessing and snapshot mirroring.
//!
//! All fallible operations in this crate return [`Result`] with
//! [`ProcessingError`], built with `thiserror` so library errors from
//! polars, reqwest, object_store and std IO convert via `?`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for collection and preprocessing operations.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// A required environment variable was not set.
    #[error("Missing environment variable '{0}'")]
    MissingEnv(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The raw snapshot shares no columns with the model schema.
    #[error("Raw snapshot at {path:?} contains none of the model columns {expected:?}")]
    NoModelColumns {
        path: PathBuf,
        expected: Vec<&'static str>,
    },

    /// HTTP transport error while talking to the metadata API.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Object storage error.
    #[error("Object storage error: {0}")]
    Storage(#[from] object_store::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;
