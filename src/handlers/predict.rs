//! Prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppError, AppResult, AppState};
use crate::inference::{self, PredictionResult};
use crate::normalize::normalize_value;
use crate::registry::Disease;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub disease: Option<Value>,
    #[serde(default)]
    pub inputs: Value,
}

impl PredictRequest {
    /// `None` when the field is missing, not a string, or not a known disease
    fn disease(&self) -> Option<Disease> {
        self.disease.as_ref()?.as_str()?.parse().ok()
    }
}

/// Run the disease's model on the request inputs.
///
/// The body is parsed as JSON whatever the declared content type.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictionResult>> {
    let req: PredictRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let disease = req.disease().ok_or(AppError::UnknownDisease)?;
    let row = normalize_value(disease, &req.inputs);

    let model = state.models.get_model(disease).ok_or_else(|| AppError::ModelUnavailable {
        load_error: state.models.get_load_error(disease).map(str::to_string),
    })?;

    let result = tokio::task::spawn_blocking(move || inference::infer(model.as_ref(), &row)).await??;

    tracing::debug!(disease = %disease, prediction = %result.prediction, "Prediction served");

    Ok(Json(result))
}
