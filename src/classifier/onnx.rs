//! ONNX Classifier - ONNX Runtime Integration
//!
//! Expects the layout scikit-learn converters emit: one float input of shape
//! `[N, n_features]`, a label output (int64 or string) and, optionally, a
//! probability output that is either a float tensor or a
//! `seq(map(int64|string, float))`.

use std::sync::OnceLock;

use anyhow::{anyhow, Context};
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor, ValueType};
use parking_lot::Mutex;

use super::{ClassLabel, Classifier, ModelError, ModelFormat, ProbabilityEstimator};

pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    n_features: Option<usize>,
    label_output: String,
    probability_output: Option<String>,
    /// Learned from zipmap keys on the first probability run
    classes: OnceLock<Vec<ClassLabel>>,
}

impl OnnxClassifier {
    /// Load ONNX model from bytes
    pub fn from_memory(model_bytes: &[u8]) -> Result<Self, ModelError> {
        let environment = ort::init()
            .with_name("diagnosis-server")
            .build()
            .map_err(|e| ModelError::Onnx(format!("Environment error: {}", e)))?;

        let session = Session::builder(&environment)
            .map_err(|e| ModelError::Onnx(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Onnx(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError::Onnx(format!("Load from memory error: {}", e)))?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| ModelError::Invalid("model declares no inputs".to_string()))?;
        let input_name = input.name().to_string();
        let n_features = match input.dtype() {
            ValueType::Tensor { shape, .. } => fixed_width(shape),
            _ => None,
        };

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
        let (label_output, probability_output) = select_outputs(&output_names)
            .ok_or_else(|| ModelError::Invalid("model declares no outputs".to_string()))?;

        tracing::debug!(
            input = %input_name,
            n_features = ?n_features,
            label = %label_output,
            probability = ?probability_output,
            "ONNX session ready"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            n_features,
            label_output,
            probability_output,
            classes: OnceLock::new(),
        })
    }

    /// One session run yielding the label and, when the model has one, the
    /// probability row
    fn run(&self, row: &[f64]) -> anyhow::Result<(ClassLabel, Option<Vec<f64>>)> {
        let shape = vec![1_i64, row.len() as i64];
        let data: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let input_tensor = Tensor::from_array((shape, data))
            .map_err(|e| anyhow!("Tensor error: {}", e))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| anyhow!("Inference failed: {}", e))?;

        let label = self.extract_label(&outputs).context("reading label output")?;
        let probability = match &self.probability_output {
            Some(name) => Some(self.extract_probability(&outputs, name).context("reading probability output")?),
            None => None,
        };

        Ok((label, probability))
    }

    fn extract_label(&self, outputs: &SessionOutputs) -> anyhow::Result<ClassLabel> {
        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| anyhow!("missing output {}", self.label_output))?;

        let label = match output.try_extract_tensor::<i64>() {
            Ok((_, data)) => data.first().map(|&v| ClassLabel::Int(v)),
            Err(_) => {
                let (_, data) = output
                    .try_extract_strings()
                    .map_err(|e| anyhow!("Extract error: {}", e))?;
                data.into_iter().next().map(ClassLabel::Text)
            }
        };

        label.ok_or_else(|| anyhow!("empty label tensor"))
    }

    fn extract_probability(&self, outputs: &SessionOutputs, name: &str) -> anyhow::Result<Vec<f64>> {
        let output = outputs
            .get(name)
            .ok_or_else(|| anyhow!("missing output {}", name))?;

        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|&p| p as f64).collect());
        }

        if DynSequenceValueType::can_downcast(output.dtype()) {
            return self.extract_from_sequence_map(output);
        }

        Err(anyhow!("unsupported probability output type"))
    }

    /// `seq(map(int64|string, float))`, as produced by converters with zipmap on
    fn extract_from_sequence_map(&self, output: &DynValue) -> anyhow::Result<Vec<f64>> {
        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence
            .try_extract_sequence::<DynMapValueType>()
            .map_err(|e| anyhow!("Failed to extract sequence: {}", e))?;

        let first = maps.first().ok_or_else(|| anyhow!("Empty sequence"))?;

        let (classes, probability) = match first.try_extract_key_values::<i64, f32>() {
            Ok(pairs) => zipmap_columns(pairs),
            Err(_) => {
                let pairs = first
                    .try_extract_key_values::<String, f32>()
                    .map_err(|e| anyhow!("Failed to extract map: {}", e))?;
                zipmap_columns(pairs)
            }
        };

        self.classes.get_or_init(|| classes);
        Ok(probability)
    }
}

/// Label output: the name containing "label", else the first output.
/// Probability output: a remaining name containing "prob", else any other.
fn select_outputs(names: &[String]) -> Option<(String, Option<String>)> {
    let label = names
        .iter()
        .find(|n| n.contains("label"))
        .or_else(|| names.first())?
        .clone();

    let probability = names
        .iter()
        .filter(|n| **n != label)
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().find(|n| **n != label))
        .cloned();

    Some((label, probability))
}

/// Feature count of a `[N, n]` input, when `n` is fixed
fn fixed_width(dims: &[i64]) -> Option<usize> {
    match dims {
        [_, n] if *n > 0 => usize::try_from(*n).ok(),
        _ => None,
    }
}

/// Zipmap entries sorted by class, split into aligned label and probability columns
fn zipmap_columns<K: Ord + Into<ClassLabel>>(mut pairs: Vec<(K, f32)>) -> (Vec<ClassLabel>, Vec<f64>) {
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
    pairs
        .into_iter()
        .map(|(class, p)| (class.into(), p as f64))
        .unzip()
}

impl Classifier for OnnxClassifier {
    fn format(&self) -> ModelFormat {
        ModelFormat::Onnx
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn predict(&self, row: &[f64]) -> anyhow::Result<ClassLabel> {
        Ok(self.run(row)?.0)
    }

    fn probabilities(&self) -> Option<&dyn ProbabilityEstimator> {
        self.probability_output.as_ref().map(|_| self as &dyn ProbabilityEstimator)
    }

    fn classes(&self) -> Option<Vec<ClassLabel>> {
        self.classes.get().cloned()
    }

    fn predict_with_proba(&self, row: &[f64]) -> anyhow::Result<(ClassLabel, Option<Vec<f64>>)> {
        self.run(row)
    }
}

impl ProbabilityEstimator for OnnxClassifier {
    fn predict_proba(&self, row: &[f64]) -> anyhow::Result<Vec<f64>> {
        self.run(row)?
            .1
            .ok_or_else(|| anyhow!("model has no probability output"))
    }
}
