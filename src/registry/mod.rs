//! Registries built once at startup: feature layouts and loaded models

pub mod features;
pub mod models;

pub use features::Disease;
pub use models::{ModelEntry, ModelRegistry};
