//! Prediction engine: feature table, simulator, fallback service and result grading

mod fallback;
mod features;
mod output;
mod simulator;

pub use fallback::{Diagnosed, DiagnosisService, PredictionSource, DEFAULT_REMOTE_TIMEOUT};
pub use features::{
    feature_spec, malignancy_score, FeatureGroup, FeatureSpec, RangeViolation, FEATURE_SPECS,
    MALIGNANCY_THRESHOLD,
};
pub use output::{
    humanize_feature, ConfidenceBand, ModelAgreement, OutputConfig, ResultFormatter,
    HIGH_CONFIDENCE, LOW_CONFIDENCE,
};
pub use simulator::{
    importance_summary, PredictionSimulator, IMAGE_EXPLANATION, IMAGE_MODELS,
    PREDICTION_ID_LEN, TABULAR_CONFIDENCE_RANGE, TABULAR_MODELS,
};

use crate::error::ClientError;
use crate::models::{FeatureVector, ImageDescriptor, PredictionResult};
use async_trait::async_trait;

/// A source of real predictions, typically the remote inference API
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn predict_tabular(&self, features: &FeatureVector)
        -> Result<PredictionResult, ClientError>;

    async fn predict_image(&self, image: &ImageDescriptor)
        -> Result<PredictionResult, ClientError>;
}
