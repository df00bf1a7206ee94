//! Router-level tests for the HTTP surface

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::classifier::{Classifier, LinearClassifier};
use crate::registry::models::LoadedModel;
use crate::registry::{Disease, ModelEntry, ModelRegistry};
use crate::test_support::{FailingClassifier, PanickingClassifier, HEART_MODEL_JSON};
use crate::{create_router, AppState};

const PARKINSON_REASON: &str = "Model file not found at /srv/models/parkinson_pipeline.onnx";
const BREAST_CANCER_REASON: &str = "Failed to load model: invalid model file: EOF while parsing a value at line 1 column 0";

fn loaded(classifier: Arc<dyn Classifier>) -> ModelEntry {
    ModelEntry::Loaded(LoadedModel {
        classifier,
        path: PathBuf::from("/srv/models/model.json"),
        sha256: "0".repeat(64),
        loaded_at: Utc::now(),
    })
}

fn failed(reason: &str) -> ModelEntry {
    ModelEntry::Failed {
        path: PathBuf::from("/srv/models/missing"),
        reason: reason.to_string(),
    }
}

fn heart_model() -> Arc<dyn Classifier> {
    Arc::new(LinearClassifier::from_slice(HEART_MODEL_JSON.as_bytes()).unwrap())
}

/// Heart loaded, the other two recorded as failures
fn app() -> Router {
    app_with(vec![
        (Disease::Parkinson, failed(PARKINSON_REASON)),
        (Disease::BreastCancer, failed(BREAST_CANCER_REASON)),
        (Disease::Heart, loaded(heart_model())),
    ])
}

fn app_with(entries: Vec<(Disease, ModelEntry)>) -> Router {
    create_router(AppState {
        models: Arc::new(ModelRegistry::from_entries(entries)),
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_predict(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// GET /features/{disease}
// ============================================================================

#[tokio::test]
async fn test_features_match_registries() {
    for disease in Disease::ALL {
        let uri = format!("/features/{}", disease.as_str().replace(' ', "%20"));
        let (status, body) = send(app(), get(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["features"], json!(disease.features()));
        assert_eq!(body["model_loaded"], json!(disease == Disease::Heart));
    }
}

#[tokio::test]
async fn test_features_surface_load_error() {
    let (_, body) = send(app(), get("/features/Parkinson")).await;
    assert_eq!(body["load_error"], json!(PARKINSON_REASON));

    let (_, body) = send(app(), get("/features/Heart")).await;
    assert_eq!(body["load_error"], Value::Null);
}

#[tokio::test]
async fn test_features_unknown_disease() {
    let (status, body) = send(app(), get("/features/unknown-id")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Unknown disease" }));
}

// ============================================================================
// POST /predict
// ============================================================================

#[tokio::test]
async fn test_predict_unknown_disease() {
    let bodies = [
        json!({ "disease": "Diabetes", "inputs": { "age": 55 } }),
        json!({ "disease": "heart", "inputs": {} }),
        json!({ "disease": 3, "inputs": {} }),
        json!({ "inputs": { "age": 55 } }),
    ];

    for body in bodies {
        let (status, response) = send(app(), post_predict(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Unknown disease" }));
    }
}

#[tokio::test]
async fn test_predict_model_not_loaded() {
    let request = post_predict(json!({ "disease": "Breast Cancer", "inputs": {} }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Model not loaded on server", "load_error": BREAST_CANCER_REASON })
    );
}

#[tokio::test]
async fn test_predict_heart_end_to_end() {
    let request = post_predict(json!({
        "disease": "Heart",
        "inputs": { "age": 55, "male": 1 }
    }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction"].is_i64(), "{}", body);

    let probability = body["probability"].as_array().unwrap();
    let classes = body["classes"].as_array().unwrap();
    assert_eq!(probability.len(), classes.len());
    assert!(probability.iter().all(Value::is_f64));

    // 0.5 * 1 + 0.06 * 55 - 8.3 < 0
    assert_eq!(body["prediction"], json!(0));
}

#[tokio::test]
async fn test_predict_is_idempotent() {
    let body = json!({
        "disease": "Heart",
        "inputs": { "age": "61", "male": true, "sysBP": 150.5, "glucose": "n/a", "noise": [1] }
    });

    let (_, first) = send(app(), post_predict(body.clone())).await;
    let (_, second) = send(app(), post_predict(body)).await;

    assert_eq!(first["prediction"], second["prediction"]);
    assert_eq!(first["probability"], second["probability"]);
}

#[tokio::test]
async fn test_predict_inference_failure() {
    let app = app_with(vec![(Disease::Parkinson, loaded(Arc::new(FailingClassifier)))]);
    let request = post_predict(json!({ "disease": "Parkinson", "inputs": {} }));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("evaluating decision function"));
    assert!(body["trace"].as_str().unwrap().contains("matrix is singular"));
}

#[tokio::test]
async fn test_predict_panic_is_inference_failure() {
    let app = app_with(vec![(Disease::Parkinson, loaded(Arc::new(PanickingClassifier)))]);
    let request = post_predict(json!({ "disease": "Parkinson", "inputs": {} }));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("index out of bounds"), "{}", body);
    assert!(body["trace"].as_str().unwrap().starts_with("panicked during inference"));
}

#[tokio::test]
async fn test_predict_width_mismatch_is_inference_failure() {
    // 14-feature heart model serving the 12-feature breast cancer layout
    let app = app_with(vec![(Disease::BreastCancer, loaded(heart_model()))]);
    let request = post_predict(json!({ "disease": "Breast Cancer", "inputs": {} }));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("X has 12 features"));
}

#[tokio::test]
async fn test_predict_ignores_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(r#"{"disease": "Heart", "inputs": {"age": 40}}"#))
        .unwrap();
    let (status, _) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_invalid_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from("disease=Heart"))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

// ============================================================================
// Status endpoints
// ============================================================================

#[tokio::test]
async fn test_models_status() {
    let (status, body) = send(app(), get("/models")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["disease"], json!("Parkinson"));
    assert_eq!(rows[0]["model_loaded"], json!(false));
    assert_eq!(rows[1]["disease"], json!("Breast Cancer"));
    assert_eq!(rows[2]["model_loaded"], json!(true));
    assert_eq!(rows[2]["format"], json!("linear"));
    assert_eq!(rows[2]["load_error"], Value::Null);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["models_loaded"], json!(1));
}

#[tokio::test]
async fn test_landing_page_lists_diseases() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    for disease in Disease::ALL {
        assert!(html.contains(disease.as_str()));
    }
}
