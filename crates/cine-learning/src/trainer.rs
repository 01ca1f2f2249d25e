//! Ordinary-least-squares training on cleaned snapshots.
//!
//! [`ModelTrainer`] loads a cleaned CSV, splits it into predictors and the
//! fixed target column, fits a linear regressor and evaluates it in-sample.
//! The returned metrics are a training-set fit quality measure; no
//! train/test split is performed.

use std::path::Path;

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::info;

use crate::error::{LearningError, Result};
use crate::types::{FitResult, FittedModel, Metrics};

/// Trains regression candidates against a fixed target column.
pub struct ModelTrainer {
    target_column: String,
}

impl ModelTrainer {
    /// Create a trainer for `target_column`.
    pub fn new(target_column: impl Into<String>) -> Self {
        ModelTrainer {
            target_column: target_column.into(),
        }
    }

    /// The target column this trainer fits against.
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Fit an OLS regressor on the cleaned snapshot at `data_path`.
    ///
    /// Predictors are all non-target columns in frame order. Fails with
    /// [`LearningError::TargetNotFound`] when the target column is absent
    /// and never substitutes a default target.
    pub fn train(&self, data_path: &Path) -> Result<FitResult> {
        let df = read_frame(data_path)?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        if !columns.iter().any(|name| *name == self.target_column) {
            return Err(LearningError::TargetNotFound(self.target_column.clone()));
        }

        let feature_names: Vec<String> = columns
            .into_iter()
            .filter(|name| *name != self.target_column)
            .collect();

        if feature_names.is_empty() {
            return Err(LearningError::NoFeatureColumns(self.target_column.clone()));
        }

        let sample_count = df.height();
        if sample_count == 0 {
            return Err(LearningError::InvalidData(
                "cleaned snapshot has no rows".to_string(),
            ));
        }

        let x = to_matrix(&df, &feature_names)?;
        let y = to_vector(&df, &self.target_column)?;

        let dataset = Dataset::new(x, y);
        let fitted = LinearRegression::default()
            .fit(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;

        let predictions = fitted.predict(&dataset);
        let mse = predictions
            .mean_squared_error(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;
        let r2 = predictions
            .r2(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;

        info!(
            "Trained on {} rows x {} features: mse={:.6}, r2={:.6}",
            sample_count,
            feature_names.len(),
            mse,
            r2
        );

        Ok(FitResult {
            model: FittedModel {
                intercept: fitted.intercept(),
                coefficients: fitted.params().to_vec(),
                feature_names: feature_names.clone(),
            },
            metrics: Metrics {
                mse,
                r2,
                features: feature_names,
                sample_count,
            },
        })
    }
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Extract the predictor matrix, one column per feature name in order.
fn to_matrix(df: &DataFrame, feature_names: &[String]) -> Result<Array2<f64>> {
    let mut x = Array2::<f64>::zeros((df.height(), feature_names.len()));
    for (j, name) in feature_names.iter().enumerate() {
        let series = df
            .column(name.as_str())?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        for (i, value) in series.f64()?.into_iter().enumerate() {
            x[(i, j)] = value.ok_or_else(|| {
                LearningError::InvalidData(format!("null value in feature column '{name}'"))
            })?;
        }
    }
    Ok(x)
}

fn to_vector(df: &DataFrame, column: &str) -> Result<Array1<f64>> {
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let mut y = Array1::<f64>::zeros(df.height());
    for (i, value) in series.f64()?.into_iter().enumerate() {
        y[i] = value.ok_or_else(|| {
            LearningError::InvalidData(format!("null value in target column '{column}'"))
        })?;
    }
    Ok(y)
}
