//! HTTP API: predictions, dashboard data, history, health and metrics

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use diagnosis_lib::{
    catalog::ModelCatalog,
    glossary::Glossary,
    history::PredictionHistory,
    predictor::{FEATURE_SPECS, IMAGE_MODELS, TABULAR_MODELS},
    DiagnosisMetrics, DiagnosisService, FeatureVector, ImageDescriptor, Modality,
    PredictionResult, PredictionSimulator,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state
pub struct AppState {
    pub service: DiagnosisService,
    pub history: PredictionHistory,
    pub catalog: ModelCatalog,
    pub metrics: DiagnosisMetrics,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let simulator = match config.seed {
            Some(seed) => PredictionSimulator::seeded(seed),
            None => PredictionSimulator::new(),
        };

        Self {
            service: DiagnosisService::offline().with_simulator(simulator),
            history: PredictionHistory::new(config.history_capacity),
            catalog: ModelCatalog::sample(),
            metrics: DiagnosisMetrics::new(),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }

    async fn remember(&self, modality: Modality, result: &PredictionResult) {
        let size = self.history.record(modality, result.clone()).await;
        self.metrics.set_history_size(size as i64);
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Breast Cancer Diagnosis API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tabular": "/api/predict/tabular",
            "image": "/api/predict/image",
            "metrics": "/api/metrics",
            "glossary": "/api/glossary",
            "history": "/api/history"
        }
    }))
}

async fn predict_tabular(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeatureVector>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(features) = payload?;

    let violations = features.range_violations();
    if !violations.is_empty() {
        debug!(count = violations.len(), "Features outside dataset range");
    }

    let diagnosed = state.service.predict_tabular(&features).await;
    state.remember(Modality::Tabular, &diagnosed.result).await;
    Ok(Json(diagnosed.result))
}

async fn predict_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictionResult>> {
    let mut multipart = multipart?;
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let mut descriptor = ImageDescriptor::new(name, bytes.to_vec());
        if let Some(content_type) = content_type {
            descriptor = descriptor.with_content_type(content_type);
        }
        image = Some(descriptor);
        break;
    }

    let image = image.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;
    debug!(image = ?image, "Image received");

    let diagnosed = state.service.predict_image(&image).await;
    state.remember(Modality::Image, &diagnosed.result).await;
    Ok(Json(diagnosed.result))
}

async fn model_metrics(State(state): State<Arc<AppState>>) -> Json<ModelCatalog> {
    Json(state.catalog.clone())
}

#[derive(Debug, Deserialize)]
struct GlossaryQuery {
    #[serde(default)]
    q: String,
}

async fn glossary(Query(query): Query<GlossaryQuery>) -> impl IntoResponse {
    Json(json!({ "categories": Glossary::search(&query.q) }))
}

async fn features() -> impl IntoResponse {
    Json(json!({
        "features": FEATURE_SPECS,
        "tabular_models": TABULAR_MODELS,
        "image_models": IMAGE_MODELS,
    }))
}

async fn list_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "predictions": state.history.list().await }))
}

async fn get_prediction(
    State(state): State<Arc<AppState>>,
    Path(prediction_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .history
        .find(&prediction_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Prediction not found".to_string()))
}

async fn clear_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state.history.clear().await;
    state.metrics.set_history_size(0);
    info!(removed = removed, "History cleared");
    Json(json!({ "message": "History cleared", "removed": removed }))
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/api/predict/tabular", post(predict_tabular))
        .route(
            "/api/predict/image",
            post(predict_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/metrics", get(model_metrics))
        .route("/api/glossary", get(glossary))
        .route("/api/features", get(features))
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/api/history/:prediction_id", get(get_prediction))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, stopping when `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
