//! Model status handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;
use crate::classifier::ModelFormat;
use crate::registry::{Disease, ModelEntry};

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub disease: Disease,
    pub model_loaded: bool,
    pub load_error: Option<String>,
    pub path: Option<String>,
    pub format: Option<ModelFormat>,
    pub sha256: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// One status row per known disease, in registry order
pub async fn list(State(state): State<AppState>) -> Json<Vec<ModelStatus>> {
    let statuses = Disease::ALL
        .into_iter()
        .map(|disease| match state.models.entry(disease) {
            Some(ModelEntry::Loaded(model)) => ModelStatus {
                disease,
                model_loaded: true,
                load_error: None,
                path: Some(model.path.display().to_string()),
                format: Some(model.format()),
                sha256: Some(model.sha256.clone()),
                loaded_at: Some(model.loaded_at),
            },
            Some(ModelEntry::Failed { path, reason }) => ModelStatus {
                disease,
                model_loaded: false,
                load_error: Some(reason.clone()),
                path: Some(path.display().to_string()),
                format: None,
                sha256: None,
                loaded_at: None,
            },
            None => ModelStatus {
                disease,
                model_loaded: false,
                load_error: None,
                path: None,
                format: None,
                sha256: None,
                loaded_at: None,
            },
        })
        .collect();

    Json(statuses)
}
