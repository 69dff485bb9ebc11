//! Prediction simulator used when the real prediction service is unreachable
//!
//! Produces plausible multi-model results without any inference. The final
//! verdict is derived first and the per-model roster is generated from it,
//! so the roster agrees with the verdict at the margins only.

use super::features::{malignancy_score, MALIGNANCY_THRESHOLD};
use crate::models::{
    clamp_confidence, Diagnosis, FeatureImportance, FeatureVector, ImageDescriptor,
    ModelPrediction, PredictionResult,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::debug;

/// Tabular model roster, in display order
pub const TABULAR_MODELS: [&str; 5] = [
    "GRU-SVM",
    "Linear Regression",
    "Softmax Regression",
    "MLP",
    "Neural Network",
];

/// Image model roster, in display order
pub const IMAGE_MODELS: [&str; 5] = [
    "DenseNet",
    "ViT-B",
    "Swin Transformer",
    "EfficientNet",
    "Ensemble",
];

/// Confidence floor and ceiling of a simulated tabular verdict
pub const TABULAR_CONFIDENCE_RANGE: (f64, f64) = (55.0, 95.0);

/// Length of a generated prediction identifier
pub const PREDICTION_ID_LEN: usize = 8;

/// Explanation attached to simulated image results
pub const IMAGE_EXPLANATION: &str = "Highlighted red regions indicate areas most correlated with malignancy. \
The ensemble model combines predictions from all vision models for improved accuracy.";

/// Salient features with their base weight and jitter band
const IMPORTANCE_WEIGHTS: [(&str, f64, f64); 10] = [
    ("concave_points_worst", 0.28, 0.05),
    ("radius_worst", 0.26, 0.04),
    ("perimeter_worst", 0.24, 0.04),
    ("area_worst", 0.22, 0.04),
    ("concavity_mean", 0.18, 0.03),
    ("radius_mean", 0.16, 0.03),
    ("compactness_worst", 0.14, 0.02),
    ("concavity_worst", 0.12, 0.02),
    ("perimeter_mean", 0.10, 0.02),
    ("area_mean", 0.08, 0.02),
];

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Simulated diagnosis engine
///
/// Generic over its random source so tests can supply a seeded or constant
/// generator and assert exact outputs.
pub struct PredictionSimulator<R = StdRng> {
    rng: R,
}

impl PredictionSimulator<StdRng> {
    /// Create a simulator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for PredictionSimulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PredictionSimulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Simulate a tabular prediction. Never fails.
    pub fn simulate_tabular(&mut self, features: &FeatureVector) -> PredictionResult {
        let score = malignancy_score(features);
        let final_prediction = Diagnosis::from_malignant(score > MALIGNANCY_THRESHOLD);

        let (floor, ceiling) = TABULAR_CONFIDENCE_RANGE;
        let confidence = (score * 100.0 + self.jitter(10.0)).clamp(floor, ceiling);

        let model_predictions = vec![
            model("GRU-SVM", final_prediction, confidence + self.jitter(5.0) - 2.0),
            model(
                "Linear Regression",
                Diagnosis::from_malignant(score > 0.40),
                confidence - 10.0 + self.jitter(5.0),
            ),
            model(
                "Softmax Regression",
                Diagnosis::from_malignant(score > 0.42),
                confidence - 5.0 + self.jitter(5.0),
            ),
            model("MLP", final_prediction, confidence + self.jitter(5.0)),
            model("Neural Network", final_prediction, confidence + self.jitter(3.0)),
        ];

        let feature_importance = self.feature_importance();

        debug!(
            score = score,
            prediction = %final_prediction,
            confidence = confidence,
            "Simulated tabular prediction"
        );

        PredictionResult {
            prediction_id: self.prediction_id(),
            final_prediction,
            confidence: clamp_confidence(confidence),
            model_predictions,
            feature_importance: Some(feature_importance),
            heatmap_base64: None,
            explanation: None,
            timestamp: Utc::now(),
        }
    }

    /// Simulate an image prediction. The descriptor is not inspected.
    pub fn simulate_image(&mut self, descriptor: &ImageDescriptor) -> PredictionResult {
        let is_malignant = self.rng.gen::<f64>() > 0.4;
        let final_prediction = Diagnosis::from_malignant(is_malignant);
        let base = self.jitter(20.0) + 75.0;

        let model_predictions = vec![
            model("DenseNet", final_prediction, base + self.jitter(5.0) - 2.0),
            model("ViT-B", final_prediction, base + self.jitter(6.0) - 3.0),
            // Swin disagrees with the verdict about 30% of the time
            model(
                "Swin Transformer",
                Diagnosis::from_malignant((self.rng.gen::<f64>() > 0.3) == is_malignant),
                base - 15.0 + self.jitter(10.0),
            ),
            model("EfficientNet", final_prediction, base + self.jitter(4.0)),
            model("Ensemble", final_prediction, base + 5.0 + self.jitter(3.0)),
        ];

        debug!(
            image = %descriptor.name,
            size_bytes = descriptor.size_bytes,
            prediction = %final_prediction,
            "Simulated image prediction"
        );

        PredictionResult {
            prediction_id: self.prediction_id(),
            final_prediction,
            confidence: clamp_confidence(base + 3.0),
            model_predictions,
            feature_importance: None,
            // Attention overlay is display-only and never computed
            heatmap_base64: Some(None),
            explanation: Some(IMAGE_EXPLANATION.to_string()),
            timestamp: Utc::now(),
        }
    }

    /// Uniform value in `[0, width)`
    fn jitter(&mut self, width: f64) -> f64 {
        self.rng.gen::<f64>() * width
    }

    fn feature_importance(&mut self) -> FeatureImportance {
        let mut weighted: Vec<(&str, f64)> = IMPORTANCE_WEIGHTS
            .iter()
            .map(|&(name, base, band)| (name, base + self.jitter(band)))
            .collect();
        weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let top_features: Vec<String> = weighted
            .iter()
            .take(3)
            .map(|(name, _)| name.to_string())
            .collect();
        let summary = importance_summary(&top_features);
        let values: BTreeMap<String, f64> = weighted
            .into_iter()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect();

        FeatureImportance {
            values,
            top_features,
            summary,
        }
    }

    fn prediction_id(&mut self) -> String {
        (0..PREDICTION_ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

fn model(name: &str, prediction: Diagnosis, confidence: f64) -> ModelPrediction {
    ModelPrediction {
        model: name.to_string(),
        prediction,
        confidence: clamp_confidence(confidence),
    }
}

/// One-line summary naming the top features
pub fn importance_summary(top_features: &[String]) -> String {
    let names: Vec<String> = top_features.iter().map(|f| f.replace('_', " ")).collect();
    let listed = match names.as_slice() {
        [] => return "No dominant features were identified.".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    };
    format!("The model focused mostly on {} features.", listed)
}
