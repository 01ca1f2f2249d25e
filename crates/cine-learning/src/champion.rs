//! Champion model management.
//!
//! The champion is the artifact pair currently considered deployed:
//! `champion_model.pkl` and `champion_model.json` in a fixed directory. A
//! freshly trained candidate replaces it only when its MSE is strictly
//! lower; ties keep the incumbent so unchanged performance never churns
//! the deployed files.
//!
//! Promotion is a plain two-file write with no locking or atomic rename:
//! concurrent runs against the same directory race (last writer wins) and
//! a reader between the two writes can observe a metrics file that does
//! not match the model file. This is accepted for a single-run batch
//! pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{LearningError, Result};
use crate::types::{FitResult, Metrics};

/// File name of the champion model blob.
pub const CHAMPION_MODEL_FILE: &str = "champion_model.pkl";

/// File name of the champion metrics.
pub const CHAMPION_METRICS_FILE: &str = "champion_model.json";

/// Policy for champion metrics that exist but cannot be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnCorruptChampion {
    /// Treat the corrupt champion as absent and promote the candidate
    /// (fail-open to availability). The default.
    #[default]
    Promote,
    /// Surface a [`LearningError::CorruptChampion`] and leave the
    /// directory untouched.
    Fail,
}

/// Compares candidates against the stored champion and performs promotion.
pub struct ChampionManager {
    dir: PathBuf,
    on_corrupt: OnCorruptChampion,
}

impl ChampionManager {
    /// Manage the champion stored in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ChampionManager {
            dir: dir.into(),
            on_corrupt: OnCorruptChampion::default(),
        }
    }

    /// Override the corrupt-metrics policy.
    pub fn with_corrupt_policy(mut self, policy: OnCorruptChampion) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Path of the champion model blob.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(CHAMPION_MODEL_FILE)
    }

    /// Path of the champion metrics.
    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(CHAMPION_METRICS_FILE)
    }

    /// The stored champion metrics, or `None` when no champion exists yet.
    ///
    /// Unreadable metrics follow the corrupt-champion policy.
    pub fn current_metrics(&self) -> Result<Option<Metrics>> {
        let path = self.metrics_path();
        if !path.exists() {
            return Ok(None);
        }
        match Metrics::read(&path) {
            Ok(metrics) => Ok(Some(metrics)),
            Err(e) => self.handle_corrupt(&path, e),
        }
    }

    /// Promote `candidate` if it beats the stored champion on MSE.
    ///
    /// Returns whether promotion occurred. A first run (no champion
    /// metrics on record) always promotes. On promotion the candidate's
    /// model blob and metrics are written together, overwriting both
    /// champion files.
    pub fn promote_if_better(&self, candidate: &FitResult) -> Result<bool> {
        if !candidate.model.is_fitted() {
            return Err(LearningError::NotFitted);
        }

        fs::create_dir_all(&self.dir)?;
        self.clear_corrupted_paths()?;

        let approved = match self.current_metrics()? {
            None => {
                info!("No champion on record; promoting first candidate");
                true
            }
            Some(champion) => {
                // Strictly better only: equal MSE keeps the incumbent.
                let better = candidate.metrics.mse < champion.mse;
                info!(
                    "Champion comparison: candidate mse={:.6} vs champion mse={:.6} -> {}",
                    candidate.metrics.mse,
                    champion.mse,
                    if better { "promote" } else { "keep champion" }
                );
                better
            }
        };

        if approved {
            candidate.model.save(&self.model_path())?;
            candidate.metrics.write(&self.metrics_path())?;
        }

        Ok(approved)
    }

    /// Remove champion paths that exist as directories.
    ///
    /// A directory where a file belongs means an earlier run (or operator)
    /// left the layout in a corrupted state.
    fn clear_corrupted_paths(&self) -> Result<()> {
        for path in [self.model_path(), self.metrics_path()] {
            if path.is_dir() {
                warn!(
                    "Champion path {} is a directory; removing corrupted state",
                    path.display()
                );
                fs::remove_dir_all(&path)?;
            }
        }
        Ok(())
    }

    fn handle_corrupt(&self, path: &Path, cause: LearningError) -> Result<Option<Metrics>> {
        match self.on_corrupt {
            OnCorruptChampion::Promote => {
                warn!(
                    "Champion metrics at {} are unreadable ({}); treating as no champion",
                    path.display(),
                    cause
                );
                Ok(None)
            }
            OnCorruptChampion::Fail => Err(LearningError::CorruptChampion {
                path: path.to_path_buf(),
                reason: cause.to_string(),
            }),
        }
    }
}
