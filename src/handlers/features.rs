//! Feature list handler

use axum::{extract::{Path, State}, Json};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};
use crate::registry::Disease;

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub features: &'static [&'static str],
    pub model_loaded: bool,
    pub load_error: Option<String>,
}

/// Ordered feature names for a disease and the state of its model
pub async fn get(
    State(state): State<AppState>,
    Path(disease): Path<String>,
) -> AppResult<Json<FeaturesResponse>> {
    let disease: Disease = disease.parse().map_err(|_| AppError::DiseaseNotFound)?;

    Ok(Json(FeaturesResponse {
        features: disease.features(),
        model_loaded: state.models.is_loaded(disease),
        load_error: state.models.get_load_error(disease).map(str::to_string),
    }))
}
