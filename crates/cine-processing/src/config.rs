//! Configuration for the collection pipeline.
//!
//! [`Settings`] is normally loaded from the environment (with a `.env` file
//! handled by the binary), but can also be assembled through
//! [`Settings::builder()`] for programmatic setups and tests.
//! [`Layout`] derives every canonical local path from the data root so that
//! path construction lives in one place.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};

/// Default base URL of the movie metadata API.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default language parameter sent with every page request.
pub const DEFAULT_LANGUAGE: &str = "ko-KR";

/// Default root for local snapshots and artifacts.
pub const DEFAULT_DATA_ROOT: &str = "data";

/// Default region for the bucket backend.
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// Default root for the directory-backed mirror when no bucket is configured.
pub const DEFAULT_MIRROR_ROOT: &str = "mirror";

/// Storage backend selection for the snapshot mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSettings {
    /// Mirror artifacts into an S3 bucket. Credentials are resolved by the
    /// storage library from the environment.
    S3 { bucket: String, region: String },
    /// Mirror artifacts into a local directory. Used when no bucket is
    /// configured, and by tests.
    Local { root: PathBuf },
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the movie metadata service.
    pub api_key: String,
    /// Base URL of the metadata API.
    pub base_url: String,
    /// Language parameter for page requests.
    pub language: String,
    /// Root directory for local snapshots (`data` by default).
    pub data_root: PathBuf,
    /// Mirror backend for raw/processed snapshots and model artifacts.
    pub storage: StorageSettings,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// `TMDB_API_KEY` is required. `S3_BUCKET` selects the bucket backend;
    /// without it the mirror falls back to a local directory.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY")
            .map_err(|_| ProcessingError::MissingEnv("TMDB_API_KEY".to_string()))?;

        let storage = match env::var("S3_BUCKET") {
            Ok(bucket) => StorageSettings::S3 {
                bucket,
                region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            },
            Err(_) => StorageSettings::Local {
                root: PathBuf::from(
                    env::var("MIRROR_ROOT").unwrap_or_else(|_| DEFAULT_MIRROR_ROOT.to_string()),
                ),
            },
        };

        let settings = Settings {
            api_key,
            base_url: env::var("TMDB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            language: env::var("TMDB_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
            data_root: PathBuf::from(
                env::var("DATA_ROOT").unwrap_or_else(|_| DEFAULT_DATA_ROOT.to_string()),
            ),
            storage,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Create a new settings builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "api_key must not be empty".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Local path layout rooted at `data_root`.
    pub fn layout(&self) -> Layout {
        Layout::new(&self.data_root)
    }
}

/// Builder for [`Settings`] with fluent API.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    language: Option<String>,
    data_root: Option<PathBuf>,
    storage: Option<StorageSettings>,
}

impl SettingsBuilder {
    /// Set the metadata API key (required).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the metadata API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the request language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Override the local data root.
    pub fn data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    /// Select the mirror backend explicitly.
    pub fn storage(mut self, storage: StorageSettings) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build and validate the settings.
    pub fn build(self) -> Result<Settings> {
        let settings = Settings {
            api_key: self
                .api_key
                .ok_or_else(|| ProcessingError::MissingEnv("TMDB_API_KEY".to_string()))?,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            language: self.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            data_root: self
                .data_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT)),
            storage: self.storage.unwrap_or(StorageSettings::Local {
                root: PathBuf::from(DEFAULT_MIRROR_ROOT),
            }),
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// Canonical local filesystem layout for one pipeline installation.
///
/// Every component reads and writes through these paths:
///
/// ```text
/// <root>/raw/<run_id>/<run_id>.csv
/// <root>/processed/<run_id>/processed_data.csv
/// <root>/output/<run_id>/{model.pkl, metrics.json}
/// <root>/champion/{champion_model.pkl, champion_model.json}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    /// The data root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the raw snapshot of one run.
    pub fn raw_dir(&self, run_id: &str) -> PathBuf {
        self.root.join("raw").join(run_id)
    }

    /// Raw snapshot CSV of one run.
    pub fn raw_csv(&self, run_id: &str) -> PathBuf {
        self.raw_dir(run_id).join(format!("{run_id}.csv"))
    }

    /// Directory holding the cleaned snapshot of one run.
    pub fn processed_dir(&self, run_id: &str) -> PathBuf {
        self.root.join("processed").join(run_id)
    }

    /// Cleaned snapshot CSV of one run.
    pub fn processed_csv(&self, run_id: &str) -> PathBuf {
        self.processed_dir(run_id).join("processed_data.csv")
    }

    /// Per-run model artifact directory.
    pub fn output_dir(&self, run_id: &str) -> PathBuf {
        self.root.join("output").join(run_id)
    }

    /// The fixed champion directory shared by all runs.
    pub fn champion_dir(&self) -> PathBuf {
        self.root.join("champion")
    }
}
