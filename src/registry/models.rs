//! Model Registry - startup-resolved model per disease

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::classifier::{self, Classifier, ModelFormat};
use crate::config::ModelPaths;

use super::Disease;

/// A successfully deserialized model and where it came from
#[derive(Clone)]
pub struct LoadedModel {
    pub classifier: Arc<dyn Classifier>,
    pub path: PathBuf,
    pub sha256: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn format(&self) -> ModelFormat {
        self.classifier.format()
    }
}

/// Outcome of loading one disease's model
#[derive(Clone)]
pub enum ModelEntry {
    Loaded(LoadedModel),
    Failed { path: PathBuf, reason: String },
}

/// Read-only table of model entries, built once before serving
pub struct ModelRegistry {
    entries: HashMap<Disease, ModelEntry>,
}

impl ModelRegistry {
    /// Load every disease's model. A failure is recorded on that disease's
    /// entry and never aborts the others.
    pub fn load(paths: &ModelPaths) -> Self {
        let entries = Disease::ALL
            .into_iter()
            .map(|disease| (disease, load_entry(disease, paths.resolve(disease))))
            .collect();

        Self { entries }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Disease, ModelEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn entry(&self, disease: Disease) -> Option<&ModelEntry> {
        self.entries.get(&disease)
    }

    pub fn get_model(&self, disease: Disease) -> Option<Arc<dyn Classifier>> {
        match self.entries.get(&disease)? {
            ModelEntry::Loaded(model) => Some(model.classifier.clone()),
            ModelEntry::Failed { .. } => None,
        }
    }

    pub fn get_load_error(&self, disease: Disease) -> Option<&str> {
        match self.entries.get(&disease)? {
            ModelEntry::Loaded(_) => None,
            ModelEntry::Failed { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn is_loaded(&self, disease: Disease) -> bool {
        matches!(self.entries.get(&disease), Some(ModelEntry::Loaded(_)))
    }

    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, ModelEntry::Loaded(_)))
            .count()
    }
}

/// Load a single model file into an entry
pub fn load_entry(disease: Disease, path: PathBuf) -> ModelEntry {
    if !path.exists() {
        let reason = format!("Model file not found at {}", path.display());
        tracing::warn!(disease = %disease, path = %path.display(), "Model file not found");
        return ModelEntry::Failed { path, reason };
    }

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => return failed(disease, path, e),
    };

    let classifier = match classifier::load_classifier(&path, &bytes) {
        Ok(classifier) => classifier,
        Err(e) => return failed(disease, path, e),
    };

    let expected = disease.features().len();
    if let Some(width) = classifier.n_features() {
        if width != expected {
            tracing::warn!(
                disease = %disease,
                model_features = width,
                registry_features = expected,
                "Model input width differs from feature layout; predictions will fail"
            );
        }
    }

    let sha256 = hex::encode(Sha256::digest(&bytes));

    tracing::info!(
        disease = %disease,
        path = %path.display(),
        format = ?classifier.format(),
        sha256 = %sha256,
        "Model loaded"
    );

    ModelEntry::Loaded(LoadedModel {
        classifier,
        path,
        sha256,
        loaded_at: Utc::now(),
    })
}

fn failed(disease: Disease, path: PathBuf, err: impl std::fmt::Display) -> ModelEntry {
    let reason = format!("Failed to load model: {}", err);
    tracing::error!(disease = %disease, path = %path.display(), error = %err, "Model failed to load");
    ModelEntry::Failed { path, reason }
}
