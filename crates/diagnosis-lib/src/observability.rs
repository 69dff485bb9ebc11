//! Observability infrastructure for the diagnosis engine
//!
//! Provides:
//! - Prometheus metrics (predictions by source, fallbacks, latency, history size)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DiagnosisMetricsInner> = OnceLock::new();

struct DiagnosisMetricsInner {
    predictions_total: IntCounterVec,
    fallbacks_total: IntCounterVec,
    prediction_latency_seconds: Histogram,
    report_failures_total: IntCounter,
    history_size: IntGauge,
}

impl DiagnosisMetricsInner {
    fn new() -> Self {
        Self {
            predictions_total: register_int_counter_vec!(
                "diagnosis_predictions_total",
                "Predictions served, by modality and source",
                &["modality", "source"]
            )
            .expect("Failed to register predictions_total"),

            fallbacks_total: register_int_counter_vec!(
                "diagnosis_fallbacks_total",
                "Remote predictions replaced by the simulator",
                &["modality"]
            )
            .expect("Failed to register fallbacks_total"),

            prediction_latency_seconds: register_histogram!(
                "diagnosis_prediction_latency_seconds",
                "End-to-end time to produce a prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            report_failures_total: register_int_counter!(
                "diagnosis_report_failures_total",
                "Report downloads that failed"
            )
            .expect("Failed to register report_failures_total"),

            history_size: register_int_gauge!(
                "diagnosis_history_size",
                "Predictions currently held in history"
            )
            .expect("Failed to register history_size"),
        }
    }
}

/// Handle to the global diagnosis metrics
///
/// Clones share the same underlying registry entries.
#[derive(Clone)]
pub struct DiagnosisMetrics {
    _private: (),
}

impl Default for DiagnosisMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosisMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DiagnosisMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DiagnosisMetricsInner {
        GLOBAL_METRICS.get_or_init(DiagnosisMetricsInner::new)
    }

    pub fn inc_predictions(&self, modality: &str, source: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[modality, source])
            .inc();
    }

    pub fn predictions(&self, modality: &str, source: &str) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[modality, source])
            .get()
    }

    pub fn inc_fallbacks(&self, modality: &str) {
        self.inner()
            .fallbacks_total
            .with_label_values(&[modality])
            .inc();
    }

    pub fn fallbacks(&self, modality: &str) -> u64 {
        self.inner().fallbacks_total.with_label_values(&[modality]).get()
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_report_failures(&self) {
        self.inner().report_failures_total.inc();
    }

    pub fn set_history_size(&self, size: i64) {
        self.inner().history_size.set(size);
    }

    /// Render the default registry in the Prometheus text format
    pub fn render(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for diagnosis events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log a served prediction
    pub fn log_prediction(
        &self,
        prediction_id: &str,
        modality: &str,
        source: &str,
        final_prediction: &str,
        confidence: u8,
        duration_us: u64,
    ) {
        info!(
            event = "prediction_generated",
            component = %self.component,
            prediction_id = %prediction_id,
            modality = %modality,
            source = %source,
            final_prediction = %final_prediction,
            confidence = confidence,
            duration_us = duration_us,
            "Generated diagnosis prediction"
        );
    }

    /// Log a remote failure that was replaced by a simulated result
    pub fn log_fallback(&self, modality: &str, error_kind: &str, reason: &str) {
        warn!(
            event = "prediction_fallback",
            component = %self.component,
            modality = %modality,
            error_kind = %error_kind,
            reason = %reason,
            "Prediction backend unavailable, using simulator"
        );
    }

    pub fn log_report_failure(&self, prediction_id: &str, reason: &str) {
        warn!(
            event = "report_download_failed",
            component = %self.component,
            prediction_id = %prediction_id,
            reason = %reason,
            "Report download failed"
        );
    }

    pub fn log_startup(&self, version: &str, address: &str) {
        info!(
            event = "server_started",
            component = %self.component,
            version = %version,
            address = %address,
            "Diagnosis server started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            component = %self.component,
            reason = %reason,
            "Diagnosis server shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handle_shares_registry() {
        let metrics = DiagnosisMetrics::new();
        let clone = metrics.clone();

        let before = metrics.predictions("tabular", "observability-test");
        clone.inc_predictions("tabular", "observability-test");
        assert_eq!(metrics.predictions("tabular", "observability-test"), before + 1);

        metrics.observe_prediction_latency(0.002);
        metrics.inc_report_failures();
        metrics.set_history_size(3);
    }

    #[test]
    fn test_render_contains_metric_names() {
        let metrics = DiagnosisMetrics::new();
        metrics.inc_fallbacks("image");
        let text = metrics.render();
        assert!(text.contains("diagnosis_fallbacks_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("diagnosis-test");
        assert_eq!(logger.component, "diagnosis-test");
        logger.log_fallback("tabular", "timeout", "request timed out");
    }
}
