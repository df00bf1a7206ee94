//! Shared fixtures for unit tests

use anyhow::{anyhow, Context};

use crate::classifier::{ClassLabel, Classifier, ModelFormat};

/// Binary logistic model over the 14 heart features
pub const HEART_MODEL_JSON: &str = r#"{
    "kind": "logistic_regression",
    "classes": [0, 1],
    "coef": [[0.5, 0.06, 0.02, 0.02, 0.1, 0.8, 0.2, 0.05, 0.002, 0.015, -0.004, 0.005, -0.002, 0.007]],
    "intercept": [-8.3]
}"#;

/// Classifier whose every prediction fails with a two-level cause chain
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn format(&self) -> ModelFormat {
        ModelFormat::Linear
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, _row: &[f64]) -> anyhow::Result<ClassLabel> {
        Err(anyhow!("matrix is singular")).context("evaluating decision function")
    }
}

/// Classifier that only answers through the combined label-and-probability
/// call, the way a single-run ONNX session does
pub struct SingleRunClassifier;

impl Classifier for SingleRunClassifier {
    fn format(&self) -> ModelFormat {
        ModelFormat::Onnx
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, _row: &[f64]) -> anyhow::Result<ClassLabel> {
        Err(anyhow!("separate predict call"))
    }

    fn classes(&self) -> Option<Vec<ClassLabel>> {
        Some(vec![ClassLabel::from("B"), ClassLabel::from("M")])
    }

    fn predict_with_proba(&self, _row: &[f64]) -> anyhow::Result<(ClassLabel, Option<Vec<f64>>)> {
        Ok((ClassLabel::from("M"), Some(vec![0.2, 0.8])))
    }
}

/// Classifier that panics mid-prediction
pub struct PanickingClassifier;

impl Classifier for PanickingClassifier {
    fn format(&self) -> ModelFormat {
        ModelFormat::Onnx
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, _row: &[f64]) -> anyhow::Result<ClassLabel> {
        panic!("index out of bounds: the len is 0 but the index is 0")
    }
}
