//! Error types for training and champion management.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for learning operations.
#[derive(Error, Debug)]
pub enum LearningError {
    /// The target column is absent from the cleaned snapshot.
    #[error("Target column '{0}' not found in dataset")]
    TargetNotFound(String),

    /// Nothing but the target column remains to train on.
    #[error("No feature columns besides the target '{0}'")]
    NoFeatureColumns(String),

    /// The cleaned snapshot is unusable for fitting.
    #[error("Invalid training data: {0}")]
    InvalidData(String),

    /// A model artifact was persisted or applied before a successful fit.
    #[error("Model has not been fitted; run train() first")]
    NotFitted,

    /// The regression fit or its evaluation failed.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// Champion metrics exist on disk but cannot be read back.
    #[error("Champion metrics at {path:?} are unreadable: {reason}")]
    CorruptChampion { path: PathBuf, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model blob serialization error.
    #[error("Model serialization error: {0}")]
    ModelBlob(#[from] bincode::Error),
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
