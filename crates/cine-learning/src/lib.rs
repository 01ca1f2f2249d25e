//! Regression training and champion model management.
//!
//! This crate covers the model half of the champion training pipeline:
//!
//! - **Training**: ordinary-least-squares fit on a cleaned snapshot with
//!   in-sample MSE/R² evaluation ([`ModelTrainer`])
//! - **Artifacts**: explicit [`FitResult`] values persisted as a model
//!   blob plus JSON metrics
//! - **Champion management**: strict-improvement promotion of candidates
//!   over the stored champion ([`ChampionManager`])
//!
//! # Quick start
//!
//! ```rust,ignore
//! use cine_learning::{ChampionManager, ModelTrainer};
//!
//! let trainer = ModelTrainer::new("vote_average");
//! let fit = trainer.train("data/processed/20240101/processed_data.csv".as_ref())?;
//!
//! fit.save("data/output/20240101".as_ref())?;
//!
//! let manager = ChampionManager::new("data/champion");
//! if manager.promote_if_better(&fit)? {
//!     println!("new champion: mse {:.4}", fit.metrics.mse);
//! }
//! ```

pub mod champion;
pub mod error;
pub mod synthetic;
pub mod trainer;
pub mod types;

// Re-exports for convenient access
pub use champion::{
    ChampionManager, OnCorruptChampion, CHAMPION_METRICS_FILE, CHAMPION_MODEL_FILE,
};
pub use error::{LearningError, Result as LearningResult};
pub use trainer::ModelTrainer;
pub use types::{FitResult, FittedModel, Metrics, METRICS_FILE, MODEL_FILE};
