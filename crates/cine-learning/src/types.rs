//! Value types produced by training: metrics, fitted models and the
//! combined [`FitResult`].
//!
//! [`FitResult`] is deliberately an explicit value rather than mutable
//! trainer state: `train` returns it and everything downstream (archive
//! persistence, champion promotion) takes it as a parameter.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LearningError, Result};

/// File name of an archived model blob.
pub const MODEL_FILE: &str = "model.pkl";

/// File name of archived metrics.
pub const METRICS_FILE: &str = "metrics.json";

/// Evaluation metrics of one trained candidate.
///
/// `mse` is the authoritative comparison key for champion promotion (lower
/// is better); `r2`, `features` and `sample_count` are informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// In-sample mean squared error.
    pub mse: f64,
    /// In-sample coefficient of determination.
    pub r2: f64,
    /// Predictor column names, in training order.
    pub features: Vec<String>,
    /// Number of rows the model was fitted on.
    pub sample_count: usize,
}

impl Metrics {
    /// Read metrics from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let metrics = serde_json::from_reader(BufReader::new(file))?;
        Ok(metrics)
    }

    /// Write metrics as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// A fitted ordinary-least-squares regressor.
///
/// Persisted as an opaque binary blob; the `.pkl` extension is kept for
/// layout compatibility with the previously deployed artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Intercept term.
    pub intercept: f64,
    /// One coefficient per feature, in `feature_names` order.
    pub coefficients: Vec<f64>,
    /// Ordered predictor names the model was fitted on.
    pub feature_names: Vec<String>,
}

impl FittedModel {
    /// Whether the model carries coefficients from a successful fit.
    pub fn is_fitted(&self) -> bool {
        !self.coefficients.is_empty()
    }

    /// Predict targets for a feature matrix with columns in
    /// `feature_names` order.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let coefficients = Array1::from_vec(self.coefficients.clone());
        x.dot(&coefficients) + self.intercept
    }

    /// Serialize the model blob to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Deserialize a model blob from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let model = bincode::deserialize_from(BufReader::new(file))?;
        Ok(model)
    }
}

/// The outcome of one training run: a fitted model and its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: FittedModel,
    pub metrics: Metrics,
}

impl FitResult {
    /// Persist the model blob and metrics into `output_dir`, creating it.
    ///
    /// Refuses to write a model without coefficients, a fit that never
    /// succeeded must not produce an artifact pair.
    pub fn save(&self, output_dir: &Path) -> Result<()> {
        if !self.model.is_fitted() {
            return Err(LearningError::NotFitted);
        }

        fs::create_dir_all(output_dir)?;
        self.model.save(&output_dir.join(MODEL_FILE))?;
        self.metrics.write(&output_dir.join(METRICS_FILE))?;

        info!("Model artifacts saved: {}", output_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_fit() -> FitResult {
        FitResult {
            model: FittedModel {
                intercept: 1.0,
                coefficients: vec![2.0, -0.5],
                feature_names: vec!["popularity".to_string(), "vote_count".to_string()],
            },
            metrics: Metrics {
                mse: 0.25,
                r2: 0.9,
                features: vec!["popularity".to_string(), "vote_count".to_string()],
                sample_count: 100,
            },
        }
    }

    #[test]
    fn test_metrics_json_field_names() {
        let json = serde_json::to_value(&sample_fit().metrics).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["features", "mse", "r2", "sample_count"]);
        assert_eq!(object["sample_count"], 100);
    }

    #[test]
    fn test_metrics_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let metrics = sample_fit().metrics;

        metrics.write(&path).unwrap();
        assert_eq!(Metrics::read(&path).unwrap(), metrics);
    }

    #[test]
    fn test_model_blob_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.pkl");
        let model = sample_fit().model;

        model.save(&path).unwrap();
        assert_eq!(FittedModel::load(&path).unwrap(), model);
    }

    #[test]
    fn test_predict_applies_coefficients_and_intercept() {
        let model = sample_fit().model;
        let x = array![[1.0, 2.0], [0.0, 0.0]];
        let y = model.predict(&x);

        // 1 + 2*1 - 0.5*2 = 2, 1 + 0 - 0 = 1
        assert!((y[0] - 2.0).abs() < 1e-12);
        assert!((y[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_save_writes_both_artifacts() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output/20240101");
        sample_fit().save(&out).unwrap();

        assert!(out.join(MODEL_FILE).exists());
        assert!(out.join(METRICS_FILE).exists());
    }

    #[test]
    fn test_save_unfitted_model_errors() {
        let dir = tempdir().unwrap();
        let mut fit = sample_fit();
        fit.model.coefficients.clear();

        let result = fit.save(dir.path());
        assert!(matches!(result, Err(LearningError::NotFitted)));
        assert!(!dir.path().join(MODEL_FILE).exists());
    }
}
