//! Inference Handler - run one row through a classifier

use serde::Serialize;
use thiserror::Error;

use crate::classifier::{ClassLabel, Classifier};

/// Response payload of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: ClassLabel,
    pub probability: Option<Vec<f64>>,
    /// Aligned with `probability` when both are present
    pub classes: Option<Vec<ClassLabel>>,
}

/// The model failed while predicting
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InferenceError {
    pub message: String,
    /// Full cause chain of the underlying failure
    pub trace: String,
}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            trace: format!("{:?}", err),
        }
    }
}

pub fn infer(model: &dyn Classifier, row: &[f64]) -> Result<PredictionResult, InferenceError> {
    let (prediction, probability) = model.predict_with_proba(row)?;

    Ok(PredictionResult {
        prediction,
        probability,
        classes: model.classes(),
    })
}
