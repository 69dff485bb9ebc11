//! Integration tests for the diagnosis API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use diagnosis_server::{
    api::{create_router, AppState},
    config::ServerConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "diagnosis-test-boundary";

fn setup_test_app(config: ServerConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(&config));
    let router = create_router(state.clone());
    (router, state)
}

fn default_app() -> Router {
    setup_test_app(ServerConfig::default()).0
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/predict/image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn high_risk_case() -> Value {
    json!({
        "radius_mean": 28.0,
        "concave_points_mean": 0.2,
        "area_worst": 4200.0,
        "concavity_worst": 1.2,
        "perimeter_worst": 250.0
    })
}

#[tokio::test]
async fn test_healthz_returns_ok() {
    let (status, body) = send(default_app(), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_predict_tabular() {
    let (app, state) = setup_test_app(ServerConfig::default());

    let (status, body) = send(app, post_json("/api/predict/tabular", high_risk_case())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final_prediction"], "Malignant");
    assert_eq!(body["model_predictions"].as_array().unwrap().len(), 5);
    assert_eq!(body["feature_importance"]["top_features"].as_array().unwrap().len(), 3);
    let confidence = body["confidence"].as_u64().unwrap();
    assert!((55..=100).contains(&confidence));

    let id = body["prediction_id"].as_str().unwrap();
    assert!(state.history.find(id).await.is_some());
}

#[tokio::test]
async fn test_predict_tabular_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/tabular")
        .header("content-type", "application/json")
        .body(Body::from("{\"radius_mean\": "))
        .unwrap();

    let (status, body) = send(default_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_image() {
    let (status, body) = send(default_app(), multipart_request("file", "scan.png", b"\x89PNG")).await;

    assert_eq!(status, StatusCode::OK);
    let models: Vec<_> = body["model_predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["model"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(models, vec!["DenseNet", "ViT-B", "Swin Transformer", "EfficientNet", "Ensemble"]);
    assert!(body.as_object().unwrap().contains_key("heatmap_base64"));
    assert!(body["heatmap_base64"].is_null());
    assert!(body["explanation"].as_str().unwrap().contains("ensemble"));
    assert!(body.get("feature_importance").is_none());
}

#[tokio::test]
async fn test_predict_image_requires_file_field() {
    let (status, body) = send(default_app(), multipart_request("image", "scan.png", b"data")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing file field");
}

#[tokio::test]
async fn test_predict_image_rejects_non_multipart() {
    let (status, body) = send(default_app(), post_json("/api/predict/image", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_seeded_servers_agree() {
    let config = ServerConfig {
        seed: Some(42),
        ..ServerConfig::default()
    };
    let (first, _) = setup_test_app(config.clone());
    let (second, _) = setup_test_app(config);

    let (_, a) = send(first, post_json("/api/predict/tabular", high_risk_case())).await;
    let (_, b) = send(second, post_json("/api/predict/tabular", high_risk_case())).await;
    assert_eq!(a["prediction_id"], b["prediction_id"]);
    assert_eq!(a["confidence"], b["confidence"]);
}

#[tokio::test]
async fn test_model_metrics() {
    let (status, body) = send(default_app(), get("/api/metrics")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comparison"]["tabular"]["best_model"], "GRU-SVM");
    assert_eq!(body["tabular_models"]["GRU-SVM"]["roc_curve"].as_array().unwrap().len(), 21);
    assert_eq!(body["dataset_info"]["tabular"]["samples"], 569);
}

#[tokio::test]
async fn test_glossary_search() {
    let (status, body) = send(default_app(), get("/api/glossary?q=benign")).await;
    assert_eq!(status, StatusCode::OK);

    let categories = body["categories"].as_array().unwrap();
    assert!(!categories.is_empty());
    assert_eq!(categories[0]["category"], "Medical Terms");

    let (_, all) = send(default_app(), get("/api/glossary")).await;
    assert_eq!(all["categories"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_feature_table() {
    let (status, body) = send(default_app(), get("/api/features")).await;
    assert_eq!(status, StatusCode::OK);

    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 30);
    assert_eq!(features[0]["name"], "radius_mean");
    assert_eq!(features[0]["group"], "mean");
    assert_eq!(body["tabular_models"][0], "GRU-SVM");
}

#[tokio::test]
async fn test_history_lifecycle() {
    let config = ServerConfig {
        history_capacity: 2,
        ..ServerConfig::default()
    };
    let (app, _state) = setup_test_app(config);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, body) = send(app.clone(), post_json("/api/predict/tabular", json!({}))).await;
        ids.push(body["prediction_id"].as_str().unwrap().to_string());
    }

    let (_, history) = send(app.clone(), get("/api/history")).await;
    let predictions = history["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["prediction_id"], ids[1].as_str());
    assert_eq!(predictions[0]["type"], "tabular");

    let (status, entry) = send(app.clone(), get(&format!("/api/history/{}", ids[2]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["prediction_id"], ids[2].as_str());

    let (status, _) = send(app.clone(), get(&format!("/api/history/{}", ids[0]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/history")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.clone(), delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, history) = send(app, get("/api/history")).await;
    assert!(history["predictions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = default_app();
    send(app.clone(), post_json("/api/predict/tabular", json!({}))).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("diagnosis_predictions_total"));
    assert!(text.contains("diagnosis_prediction_latency_seconds"));
}
