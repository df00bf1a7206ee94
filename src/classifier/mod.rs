//! Classifier Module - Model Formats Behind One Interface
//!
//! Every model format implements [`Classifier`]. Probability estimation and
//! class labels are optional capabilities; callers query them instead of
//! assuming them.

pub mod linear;
pub mod onnx;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use linear::LinearClassifier;
pub use onnx::OnnxClassifier;

// ============================================================================
// LABELS
// ============================================================================

/// Class label as produced by a model: integral labels stay integers,
/// anything else is carried as text.
///
/// Ordering puts integers before text, each in natural order, which matches
/// the sorted `classes_` scikit-learn exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Text(String),
}

/// Label as it may appear in a model file; numpy exporters write integral
/// classes as `0.0`, `1.0`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawLabel> for ClassLabel {
    fn from(raw: RawLabel) -> Self {
        match raw {
            RawLabel::Int(v) => ClassLabel::Int(v),
            RawLabel::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => ClassLabel::Int(v as i64),
            RawLabel::Float(v) => ClassLabel::Text(v.to_string()),
            RawLabel::Text(s) => ClassLabel::Text(s),
        }
    }
}

impl<'de> Deserialize<'de> for ClassLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawLabel::deserialize(deserializer).map(ClassLabel::from)
    }
}

impl From<i64> for ClassLabel {
    fn from(value: i64) -> Self {
        ClassLabel::Int(value)
    }
}

impl From<String> for ClassLabel {
    fn from(value: String) -> Self {
        ClassLabel::Text(value)
    }
}

impl From<&str> for ClassLabel {
    fn from(value: &str) -> Self {
        ClassLabel::Text(value.to_string())
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Int(v) => write!(f, "{}", v),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// FORMATS
// ============================================================================

/// On-disk model format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Linear,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::Linear),
            _ => None,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure while deserializing a model file
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid model file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("ONNX Runtime: {0}")]
    Onnx(String),
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Optional capability: per-class probabilities for one row
pub trait ProbabilityEstimator {
    fn predict_proba(&self, row: &[f64]) -> anyhow::Result<Vec<f64>>;
}

/// A loaded, ready-to-run model
pub trait Classifier: Send + Sync {
    fn format(&self) -> ModelFormat;

    /// Input width the model declares, when the format records it
    fn n_features(&self) -> Option<usize>;

    /// Predicted label for a single row
    fn predict(&self, row: &[f64]) -> anyhow::Result<ClassLabel>;

    fn probabilities(&self) -> Option<&dyn ProbabilityEstimator> {
        None
    }

    /// Known class labels, aligned with `predict_proba` output
    fn classes(&self) -> Option<Vec<ClassLabel>> {
        None
    }

    /// Label plus probabilities when supported. Formats that produce both in
    /// one evaluation override this.
    fn predict_with_proba(&self, row: &[f64]) -> anyhow::Result<(ClassLabel, Option<Vec<f64>>)> {
        let label = self.predict(row)?;
        let probability = match self.probabilities() {
            Some(estimator) => Some(estimator.predict_proba(row)?),
            None => None,
        };
        Ok((label, probability))
    }
}

/// Deserialize a model from raw file bytes. `path` only selects the format.
pub fn load_classifier(path: &Path, bytes: &[u8]) -> Result<Arc<dyn Classifier>, ModelError> {
    match ModelFormat::from_path(path) {
        Some(ModelFormat::Linear) => Ok(Arc::new(LinearClassifier::from_slice(bytes)?)),
        Some(ModelFormat::Onnx) => Ok(Arc::new(OnnxClassifier::from_memory(bytes)?)),
        None => Err(ModelError::UnsupportedFormat(path.display().to_string())),
    }
}
