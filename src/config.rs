//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::registry::Disease;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model file locations
    pub models: ModelPaths,

    /// Environment (development, production)
    pub environment: String,
}

/// Where each disease's model lives on disk.
///
/// Relative paths are resolved against `base_dir`.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub base_dir: PathBuf,
    pub parkinson: PathBuf,
    pub breast_cancer: PathBuf,
    pub heart: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            parkinson: PathBuf::from("models/parkinson_pipeline.onnx"),
            breast_cancer: PathBuf::from("models/breast_cancer_pipeline.onnx"),
            heart: PathBuf::from("models/heart_disease_logistic.json"),
        }
    }
}

impl ModelPaths {
    /// Configured path for a disease, as written in the configuration.
    pub fn configured(&self, disease: Disease) -> &PathBuf {
        match disease {
            Disease::Parkinson => &self.parkinson,
            Disease::BreastCancer => &self.breast_cancer,
            Disease::Heart => &self.heart,
        }
    }

    /// Full path for a disease; absolute paths are kept as-is.
    pub fn resolve(&self, disease: Disease) -> PathBuf {
        let path = self.configured(disease);
        if path.is_absolute() {
            path.clone()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = ModelPaths::default();

        Self {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            models: ModelPaths {
                base_dir: path_var("MODEL_BASE_DIR", defaults.base_dir),
                parkinson: path_var("PARKINSON_MODEL_PATH", defaults.parkinson),
                breast_cancer: path_var("BREAST_CANCER_MODEL_PATH", defaults.breast_cancer),
                heart: path_var("HEART_MODEL_PATH", defaults.heart),
            },

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn path_var(key: &str, default: PathBuf) -> PathBuf {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}
