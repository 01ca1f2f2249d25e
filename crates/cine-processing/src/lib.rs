//! Movie metadata collection and preprocessing.
//!
//! This crate covers the data half of the champion training pipeline:
//!
//! - **Collection**: paginated fetch of popular-movie metadata into raw
//!   CSV snapshots ([`MovieCollector`])
//! - **Preprocessing**: projection onto the model schema and removal of
//!   incomplete or degenerate rows ([`Preprocessor`])
//! - **Mirroring**: upload/download of snapshots and model artifacts to an
//!   object store ([`ArtifactStore`])
//! - **Configuration**: environment-driven [`Settings`] and the canonical
//!   local path [`Layout`]
//!
//! # Quick start
//!
//! ```rust,ignore
//! use cine_processing::{MovieCollector, Preprocessor, Settings};
//!
//! let settings = Settings::from_env()?;
//! let collector = MovieCollector::new(&settings)?;
//!
//! let mut raw = collector.fetch_popular(20)?;
//! let raw_path = collector.save_raw(&mut raw, "20240101")?;
//!
//! let cleaned = Preprocessor::new(&settings).transform(&raw_path)?;
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod preprocessor;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use collector::{records_to_frame, MovieCollector};
pub use config::{Layout, Settings, SettingsBuilder, StorageSettings};
pub use error::{ProcessingError, Result as ProcessingResult};
pub use preprocessor::{Preprocessor, MODEL_COLUMNS, TARGET_COLUMN};
pub use storage::ArtifactStore;
pub use types::{MovieRecord, PopularPage};
pub use utils::{read_frame, write_frame};
