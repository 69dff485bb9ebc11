//! Remote-first prediction with simulator fallback
//!
//! The backend is called under a timeout. Any failure (transport, status,
//! body or timeout) is replaced by a simulated result, so callers always get
//! a prediction back.

use super::simulator::PredictionSimulator;
use super::PredictionBackend;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{FeatureVector, ImageDescriptor, Modality, PredictionResult};
use crate::observability::{DiagnosisMetrics, StructuredLogger};
use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Time allowed for a remote prediction before falling back
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a served result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Remote,
    Simulated,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Remote => "remote",
            PredictionSource::Simulated => "simulated",
        }
    }
}

/// A prediction together with its provenance
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosed {
    pub result: PredictionResult,
    pub source: PredictionSource,
    /// Backend failure that caused the substitution, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Two-step prediction strategy: remote backend, then simulator
pub struct DiagnosisService<B = ApiClient> {
    backend: Option<B>,
    simulator: Mutex<PredictionSimulator>,
    timeout: Duration,
    metrics: DiagnosisMetrics,
    logger: StructuredLogger,
}

impl DiagnosisService {
    /// Service that never contacts a backend
    pub fn offline() -> Self {
        Self::new(None)
    }
}

impl<B: PredictionBackend> DiagnosisService<B> {
    pub fn new(backend: Option<B>) -> Self {
        Self {
            backend,
            simulator: Mutex::new(PredictionSimulator::new()),
            timeout: DEFAULT_REMOTE_TIMEOUT,
            metrics: DiagnosisMetrics::new(),
            logger: StructuredLogger::new("diagnosis-service"),
        }
    }

    pub fn with_backend(backend: B) -> Self {
        Self::new(Some(backend))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the simulator, e.g. with a seeded one for reproducible output
    pub fn with_simulator(mut self, simulator: PredictionSimulator) -> Self {
        self.simulator = Mutex::new(simulator);
        self
    }

    pub fn is_offline(&self) -> bool {
        self.backend.is_none()
    }

    pub async fn predict_tabular(&self, features: &FeatureVector) -> Diagnosed {
        let start = Instant::now();
        let remote = match &self.backend {
            Some(backend) => Some(self.time_boxed(backend.predict_tabular(features)).await),
            None => None,
        };
        self.resolve(Modality::Tabular, remote, start, |sim| {
            sim.simulate_tabular(features)
        })
    }

    pub async fn predict_image(&self, image: &ImageDescriptor) -> Diagnosed {
        let start = Instant::now();
        let remote = match &self.backend {
            Some(backend) => Some(self.time_boxed(backend.predict_image(image)).await),
            None => None,
        };
        let mut diagnosed =
            self.resolve(Modality::Image, remote, start, |sim| sim.simulate_image(image));
        // Image results always carry the heatmap key
        if diagnosed.result.heatmap_base64.is_none() {
            diagnosed.result.heatmap_base64 = Some(None);
        }
        diagnosed
    }

    async fn time_boxed<F>(&self, call: F) -> Result<PredictionResult, ClientError>
    where
        F: std::future::Future<Output = Result<PredictionResult, ClientError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Timeout(self.timeout)),
        }
    }

    fn resolve<F>(
        &self,
        modality: Modality,
        remote: Option<Result<PredictionResult, ClientError>>,
        start: Instant,
        simulate: F,
    ) -> Diagnosed
    where
        F: FnOnce(&mut PredictionSimulator) -> PredictionResult,
    {
        let diagnosed = match remote {
            Some(Ok(result)) => Diagnosed {
                result,
                source: PredictionSource::Remote,
                fallback_reason: None,
            },
            Some(Err(e)) => {
                let reason = e.to_string();
                self.logger.log_fallback(modality.as_str(), e.kind(), &reason);
                self.metrics.inc_fallbacks(modality.as_str());
                Diagnosed {
                    result: self.simulate(simulate),
                    source: PredictionSource::Simulated,
                    fallback_reason: Some(reason),
                }
            }
            None => {
                debug!(modality = %modality, "No backend configured, simulating");
                Diagnosed {
                    result: self.simulate(simulate),
                    source: PredictionSource::Simulated,
                    fallback_reason: None,
                }
            }
        };

        let elapsed = start.elapsed();
        self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
        self.metrics
            .inc_predictions(modality.as_str(), diagnosed.source.as_str());
        self.logger.log_prediction(
            &diagnosed.result.prediction_id,
            modality.as_str(),
            diagnosed.source.as_str(),
            &diagnosed.result.final_prediction.to_string(),
            diagnosed.result.confidence,
            elapsed.as_micros() as u64,
        );
        diagnosed
    }

    fn simulate<F>(&self, simulate: F) -> PredictionResult
    where
        F: FnOnce(&mut PredictionSimulator) -> PredictionResult,
    {
        // A panic while holding the lock leaves the rng usable
        let mut simulator = self
            .simulator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        simulate(&mut simulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnosis, ModelPrediction};
    use async_trait::async_trait;
    use chrono::Utc;

    enum MockBackend {
        Healthy,
        Failing,
        Slow(Duration),
    }

    fn remote_result() -> PredictionResult {
        PredictionResult {
            prediction_id: "remote01".to_string(),
            final_prediction: Diagnosis::Malignant,
            confidence: 97,
            model_predictions: vec![ModelPrediction {
                model: "GRU-SVM".to_string(),
                prediction: Diagnosis::Malignant,
                confidence: 97,
            }],
            feature_importance: None,
            heatmap_base64: None,
            explanation: None,
            timestamp: Utc::now(),
        }
    }

    impl MockBackend {
        async fn respond(&self) -> Result<PredictionResult, ClientError> {
            match self {
                MockBackend::Healthy => Ok(remote_result()),
                MockBackend::Failing => Err(ClientError::Status {
                    status: 500,
                    body: "model not loaded".to_string(),
                }),
                MockBackend::Slow(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(remote_result())
                }
            }
        }
    }

    #[async_trait]
    impl PredictionBackend for MockBackend {
        async fn predict_tabular(
            &self,
            _features: &FeatureVector,
        ) -> Result<PredictionResult, ClientError> {
            self.respond().await
        }

        async fn predict_image(
            &self,
            _image: &ImageDescriptor,
        ) -> Result<PredictionResult, ClientError> {
            self.respond().await
        }
    }

    #[tokio::test]
    async fn test_remote_result_passed_through() {
        let service = DiagnosisService::with_backend(MockBackend::Healthy);
        let diagnosed = service.predict_tabular(&FeatureVector::reference()).await;

        assert_eq!(diagnosed.source, PredictionSource::Remote);
        assert_eq!(diagnosed.result.prediction_id, "remote01");
        assert!(diagnosed.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn test_error_status_falls_back() {
        let metrics = DiagnosisMetrics::new();
        let before = metrics.fallbacks("tabular");

        let service = DiagnosisService::with_backend(MockBackend::Failing);
        let diagnosed = service.predict_tabular(&FeatureVector::reference()).await;

        assert_eq!(diagnosed.source, PredictionSource::Simulated);
        assert_eq!(diagnosed.result.model_predictions.len(), 5);
        assert!(diagnosed.result.feature_importance.is_some());
        assert!(diagnosed
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("500"));
        assert!(metrics.fallbacks("tabular") > before);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let service = DiagnosisService::with_backend(MockBackend::Slow(Duration::from_secs(5)))
            .with_timeout(Duration::from_millis(20));
        let image = ImageDescriptor::new("scan.png", vec![0u8; 16]);
        let diagnosed = service.predict_image(&image).await;

        assert_eq!(diagnosed.source, PredictionSource::Simulated);
        assert!(diagnosed.result.explanation.is_some());
        assert!(diagnosed
            .fallback_reason
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_remote_image_result_carries_heatmap_key() {
        let service = DiagnosisService::with_backend(MockBackend::Healthy);
        let diagnosed = service
            .predict_image(&ImageDescriptor::new("scan.png", vec![1, 2]))
            .await;

        assert_eq!(diagnosed.source, PredictionSource::Remote);
        assert_eq!(diagnosed.result.heatmap_base64, Some(None));
        let json = serde_json::to_value(&diagnosed.result).unwrap();
        assert!(json["heatmap_base64"].is_null());
        assert!(json.as_object().unwrap().contains_key("heatmap_base64"));
    }

    #[tokio::test]
    async fn test_slow_backend_within_timeout() {
        let service = DiagnosisService::with_backend(MockBackend::Slow(Duration::from_millis(5)))
            .with_timeout(Duration::from_secs(2));
        let diagnosed = service.predict_tabular(&FeatureVector::default()).await;
        assert_eq!(diagnosed.source, PredictionSource::Remote);
    }

    #[tokio::test]
    async fn test_offline_always_simulates() {
        let service: DiagnosisService = DiagnosisService::offline();
        assert!(service.is_offline());

        let diagnosed = service.predict_tabular(&FeatureVector::reference()).await;
        assert_eq!(diagnosed.source, PredictionSource::Simulated);
        assert!(diagnosed.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn test_seeded_simulators_agree() {
        let first = DiagnosisService::offline().with_simulator(PredictionSimulator::seeded(7));
        let second = DiagnosisService::offline().with_simulator(PredictionSimulator::seeded(7));
        let features = FeatureVector::reference();

        let a = first.predict_tabular(&features).await.result;
        let b = second.predict_tabular(&features).await.result;
        assert_eq!(a.prediction_id, b.prediction_id);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_diagnosed_serializes_source() {
        let diagnosed = Diagnosed {
            result: remote_result(),
            source: PredictionSource::Simulated,
            fallback_reason: None,
        };
        let json = serde_json::to_value(&diagnosed).unwrap();
        assert_eq!(json["source"], "simulated");
        assert!(json.get("fallback_reason").is_none());
    }
}
