//! Linear Classifier - JSON-serialized logistic regression / linear SVM
//!
//! File layout:
//!
//! ```json
//! {
//!   "kind": "logistic_regression",
//!   "classes": [0, 1],
//!   "coef": [[0.02, 0.06, ...]],
//!   "intercept": [-8.1],
//!   "scaler": { "mean": [...], "scale": [...] }
//! }
//! ```
//!
//! Binary models carry a single coefficient row whose positive side is
//! `classes[1]`; multiclass models carry one row per class.

use anyhow::bail;
use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::{ClassLabel, Classifier, ModelError, ModelFormat, ProbabilityEstimator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearKind {
    LogisticRegression,
    /// Decision function only, no probabilities
    LinearSvc,
}

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct LinearModelFile {
    kind: LinearKind,
    classes: Vec<ClassLabel>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default)]
    scaler: Option<ScalerFile>,
}

/// Standard-scaler step applied before the linear layer
#[derive(Debug, Clone)]
struct Scaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    kind: LinearKind,
    classes: Vec<ClassLabel>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
    scaler: Option<Scaler>,
}

impl LinearClassifier {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let file: LinearModelFile = serde_json::from_slice(bytes)?;
        Self::from_parts(file)
    }

    fn from_parts(file: LinearModelFile) -> Result<Self, ModelError> {
        let rows = file.coef.len();
        let width = file.coef.first().map(Vec::len).unwrap_or(0);

        if rows == 0 || width == 0 {
            return Err(ModelError::Invalid("empty coefficient matrix".to_string()));
        }
        if file.coef.iter().any(|row| row.len() != width) {
            return Err(ModelError::Invalid("ragged coefficient matrix".to_string()));
        }
        if file.intercept.len() != rows {
            return Err(ModelError::Invalid(format!(
                "expected {} intercepts, got {}",
                rows,
                file.intercept.len()
            )));
        }

        let n_classes = file.classes.len();
        let shape_ok = if rows == 1 { n_classes == 2 } else { n_classes == rows && n_classes > 2 };
        if !shape_ok {
            return Err(ModelError::Invalid(format!(
                "{} coefficient rows do not fit {} classes",
                rows, n_classes
            )));
        }

        let scaler = match file.scaler {
            Some(s) => {
                if s.mean.len() != width || s.scale.len() != width {
                    return Err(ModelError::Invalid(format!(
                        "scaler expects {} features",
                        width
                    )));
                }
                // Zero variance columns are left unscaled.
                let scale = s.scale.into_iter().map(|v| if v == 0.0 { 1.0 } else { v });
                Some(Scaler {
                    mean: Array1::from(s.mean),
                    scale: scale.collect(),
                })
            }
            None => None,
        };

        let flat: Vec<f64> = file.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((rows, width), flat)
            .map_err(|e| ModelError::Invalid(e.to_string()))?;

        Ok(Self {
            kind: file.kind,
            classes: file.classes,
            coef,
            intercept: Array1::from(file.intercept),
            scaler,
        })
    }

    fn decision_function(&self, row: &[f64]) -> anyhow::Result<Array1<f64>> {
        let expected = self.coef.ncols();
        if row.len() != expected {
            bail!(
                "X has {} features, but the model is expecting {} features as input",
                row.len(),
                expected
            );
        }

        let mut x = Array1::from(row.to_vec());
        if let Some(scaler) = &self.scaler {
            x = (&x - &scaler.mean) / &scaler.scale;
        }

        Ok(self.coef.dot(&x) + &self.intercept)
    }
}

impl Classifier for LinearClassifier {
    fn format(&self) -> ModelFormat {
        ModelFormat::Linear
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.ncols())
    }

    fn predict(&self, row: &[f64]) -> anyhow::Result<ClassLabel> {
        let scores = self.decision_function(row)?;
        let index = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores)
        };
        Ok(self.classes[index].clone())
    }

    fn probabilities(&self) -> Option<&dyn ProbabilityEstimator> {
        match self.kind {
            LinearKind::LogisticRegression => Some(self),
            LinearKind::LinearSvc => None,
        }
    }

    fn classes(&self) -> Option<Vec<ClassLabel>> {
        Some(self.classes.clone())
    }
}

impl ProbabilityEstimator for LinearClassifier {
    fn predict_proba(&self, row: &[f64]) -> anyhow::Result<Vec<f64>> {
        let scores = self.decision_function(row)?;
        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }
        Ok(softmax(&scores))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &Array1<f64>) -> Vec<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// First index of the maximum, matching numpy's tie-breaking
fn argmax(scores: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    best
}
