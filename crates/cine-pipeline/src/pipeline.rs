//! Pipeline orchestration.
//!
//! [`Pipeline`] sequences the collect, preprocess and train stages and
//! mirrors each stage's local output to the artifact store. Stages are
//! independently runnable; `run_all` executes them unconditionally in
//! sequence, so a failed stage does not stop the next one from trying
//! (train may then fail cleanly against a snapshot that was never
//! produced). Object-store transfers are best-effort: a failed upload or
//! download is logged, never fatal to the stage.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use tracing::{error, info, warn};

use cine_learning::{
    ChampionManager, FitResult, ModelTrainer, CHAMPION_METRICS_FILE, CHAMPION_MODEL_FILE,
    METRICS_FILE, MODEL_FILE,
};
use cine_processing::{
    ArtifactStore, Layout, MovieCollector, Preprocessor, Settings, TARGET_COLUMN,
};

/// Default number of pages fetched per collection run.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Remote prefix of the champion artifact pair.
const CHAMPION_PREFIX: &str = "models/champion";

/// Orchestrates one dated run of the batch pipeline.
pub struct Pipeline {
    layout: Layout,
    store: ArtifactStore,
    collector: MovieCollector,
    preprocessor: Preprocessor,
    trainer: ModelTrainer,
    run_id: String,
}

impl Pipeline {
    /// Build a pipeline stamped with today's run id (`%Y%m%d`).
    pub fn new(settings: Settings) -> Result<Self> {
        let run_id = Local::now().format("%Y%m%d").to_string();
        Self::with_run_id(settings, run_id)
    }

    /// Build a pipeline with an explicit run id.
    pub fn with_run_id(settings: Settings, run_id: impl Into<String>) -> Result<Self> {
        Ok(Pipeline {
            layout: settings.layout(),
            store: ArtifactStore::from_settings(&settings)?,
            collector: MovieCollector::new(&settings)?,
            preprocessor: Preprocessor::new(&settings),
            trainer: ModelTrainer::new(TARGET_COLUMN),
            run_id: run_id.into(),
        })
    }

    /// This pipeline's run id.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Stage 1: fetch movie pages, persist the raw snapshot, mirror it.
    pub fn collect(&self, page_limit: u32) -> Result<PathBuf> {
        info!("Step 1: collecting movie data (run {})", self.run_id);

        let mut raw = self.collector.fetch_popular(page_limit)?;
        let local = self.collector.save_raw(&mut raw, &self.run_id)?;
        self.mirror_upload(&local, &format!("raw/{}", self.run_id));

        Ok(local)
    }

    /// Stage 2: restore the raw snapshot, clean it, mirror the result.
    ///
    /// With no explicit key the run's own raw snapshot is fetched from the
    /// store; a miss falls back to whatever local raw snapshot exists.
    pub fn preprocess(&self, remote_raw: Option<&str>) -> Result<PathBuf> {
        info!("Step 2: preprocessing (run {})", self.run_id);

        let key = remote_raw
            .map(str::to_string)
            .unwrap_or_else(|| format!("raw/{run}/{run}.csv", run = self.run_id));

        let raw_path = match self.mirror_download(&key, &self.layout.raw_dir(&self.run_id)) {
            Some(path) => path,
            None => {
                let local = self.layout.raw_csv(&self.run_id);
                warn!(
                    "Raw snapshot not mirrored; falling back to local {}",
                    local.display()
                );
                local
            }
        };

        let cleaned = self.preprocessor.transform(&raw_path)?;
        let local = self.preprocessor.save_processed(cleaned, &self.run_id)?;
        self.mirror_upload(&local, &format!("processed/{}", self.run_id));

        Ok(local)
    }

    /// Stage 3: train a candidate, archive it, and run the champion check.
    ///
    /// Returns whether the candidate was promoted.
    pub fn train(&self, remote_processed: Option<&str>, model_name: &str) -> Result<bool> {
        info!(
            "Step 3: training and champion check (run {}, model {})",
            self.run_id, model_name
        );

        // Warm the local champion directory from the store so the
        // comparison sees the latest deployed metrics.
        let champion_dir = self.layout.champion_dir();
        for file in [CHAMPION_METRICS_FILE, CHAMPION_MODEL_FILE] {
            self.mirror_download(&format!("{CHAMPION_PREFIX}/{file}"), &champion_dir);
        }

        if let Some(key) = remote_processed {
            self.mirror_download(key, &self.layout.processed_dir(&self.run_id));
        }

        let processed = self.layout.processed_csv(&self.run_id);
        let fit = self.trainer.train(&processed)?;

        self.archive(&fit)?;

        let manager = ChampionManager::new(&champion_dir);
        let promoted = manager.promote_if_better(&fit)?;

        if promoted {
            info!(
                "New champion (mse {:.6}); mirroring artifact pair",
                fit.metrics.mse
            );
            self.mirror_upload(&manager.metrics_path(), CHAMPION_PREFIX);
            self.mirror_upload(&manager.model_path(), CHAMPION_PREFIX);
        } else {
            info!("Champion retained; no artifacts mirrored");
        }

        Ok(promoted)
    }

    /// Run all stages in sequence.
    ///
    /// Stage failures are logged and do not stop later stages.
    pub fn run_all(&self, page_limit: u32) {
        if let Err(e) = self.collect(page_limit) {
            error!("Collection failed: {e:?}");
        }
        if let Err(e) = self.preprocess(None) {
            error!("Preprocessing failed: {e:?}");
        }
        match self.train(None, "v1") {
            Ok(promoted) => info!("Run complete; promoted: {promoted}"),
            Err(e) => error!("Training failed: {e:?}"),
        }
    }

    /// Write the dated archive pair and mirror it.
    fn archive(&self, fit: &FitResult) -> Result<()> {
        let output_dir = self.layout.output_dir(&self.run_id);
        fit.save(&output_dir)?;

        let prefix = format!("models/archive/{}", self.run_id);
        self.mirror_upload(&output_dir.join(MODEL_FILE), &prefix);
        self.mirror_upload(&output_dir.join(METRICS_FILE), &prefix);
        Ok(())
    }

    fn mirror_upload(&self, local: &Path, prefix: &str) {
        if let Err(e) = self.store.upload(local, prefix) {
            warn!("Upload of {} failed: {}", local.display(), e);
        }
    }

    fn mirror_download(&self, key: &str, local_dir: &Path) -> Option<PathBuf> {
        match self.store.download(key, local_dir) {
            Ok(found) => found,
            Err(e) => {
                warn!("Download of {} failed: {}", key, e);
                None
            }
        }
    }
}
