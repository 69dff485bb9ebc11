//! Result post-processing for display
//!
//! Tabulates how the model roster lines up with the final verdict and
//! grades confidence the same way for remote and simulated results.

use crate::models::{Diagnosis, PredictionResult};
use serde::Serialize;

/// Confidence at or above which a verdict is graded high
pub const HIGH_CONFIDENCE: u8 = 85;

/// Confidence below which a verdict is flagged as low confidence
pub const LOW_CONFIDENCE: u8 = 70;

/// Agreement ratio below which the roster counts as split
pub const SPLIT_AGREEMENT_RATIO: f64 = 0.6;

/// Configuration for result formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Confidence graded as high (default: 85)
    pub high_confidence: u8,
    /// Confidence below which a result is flagged (default: 70)
    pub low_confidence_threshold: u8,
    /// Agreement ratio below which the roster is considered split
    pub split_agreement_ratio: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            high_confidence: HIGH_CONFIDENCE,
            low_confidence_threshold: LOW_CONFIDENCE,
            split_agreement_ratio: SPLIT_AGREEMENT_RATIO,
        }
    }
}

/// Coarse confidence grade shown next to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Moderate => "moderate",
            ConfidenceBand::Low => "low",
        }
    }
}

/// How the per-model roster lines up with the final verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAgreement {
    pub verdict: Diagnosis,
    pub agreeing: usize,
    pub dissenting: usize,
    pub total: usize,
    pub dissenting_models: Vec<String>,
}

impl ModelAgreement {
    /// Count roster entries that match the final verdict
    pub fn tabulate(result: &PredictionResult) -> Self {
        let verdict = result.final_prediction;
        let dissenting_models: Vec<String> = result
            .model_predictions
            .iter()
            .filter(|m| m.prediction != verdict)
            .map(|m| m.model.clone())
            .collect();
        let total = result.model_predictions.len();
        let dissenting = dissenting_models.len();

        Self {
            verdict,
            agreeing: total - dissenting,
            dissenting,
            total,
            dissenting_models,
        }
    }

    pub fn is_unanimous(&self) -> bool {
        self.dissenting == 0
    }

    /// Fraction of models agreeing with the verdict, 1.0 for an empty roster
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.agreeing as f64 / self.total as f64
    }
}

/// Grades and annotates prediction results
pub struct ResultFormatter {
    config: OutputConfig,
}

impl ResultFormatter {
    pub fn new() -> Self {
        Self {
            config: OutputConfig::default(),
        }
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn confidence_band(&self, confidence: u8) -> ConfidenceBand {
        if confidence >= self.config.high_confidence {
            ConfidenceBand::High
        } else if confidence >= self.config.low_confidence_threshold {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }

    /// Check if a result has low confidence or a split roster
    pub fn is_low_confidence(&self, result: &PredictionResult) -> bool {
        self.low_confidence_reason(result).is_some()
    }

    /// Get the reason a result should be read with caution (if applicable)
    pub fn low_confidence_reason(&self, result: &PredictionResult) -> Option<String> {
        let agreement = ModelAgreement::tabulate(result);
        if agreement.ratio() < self.config.split_agreement_ratio {
            Some(format!(
                "Models disagree: {} of {} dissent from the {} verdict",
                agreement.dissenting, agreement.total, agreement.verdict
            ))
        } else if result.confidence < self.config.low_confidence_threshold {
            Some(format!(
                "Confidence {}% is below {}%",
                result.confidence, self.config.low_confidence_threshold
            ))
        } else {
            None
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Display label for a feature key, e.g. `concave_points_worst` -> `Concave Points Worst`
pub fn humanize_feature(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelPrediction;
    use chrono::Utc;

    fn result_with(final_prediction: Diagnosis, confidence: u8, roster: &[Diagnosis]) -> PredictionResult {
        PredictionResult {
            prediction_id: "abcd1234".to_string(),
            final_prediction,
            confidence,
            model_predictions: roster
                .iter()
                .enumerate()
                .map(|(i, d)| ModelPrediction {
                    model: format!("model-{}", i),
                    prediction: *d,
                    confidence,
                })
                .collect(),
            feature_importance: None,
            heatmap_base64: None,
            explanation: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_agreement_tabulation() {
        use Diagnosis::{Benign, Malignant};
        let result = result_with(Malignant, 90, &[Malignant, Benign, Malignant, Malignant, Benign]);
        let agreement = ModelAgreement::tabulate(&result);

        assert_eq!(agreement.agreeing, 3);
        assert_eq!(agreement.dissenting, 2);
        assert_eq!(agreement.total, 5);
        assert_eq!(agreement.dissenting_models, vec!["model-1", "model-4"]);
        assert!(!agreement.is_unanimous());
        assert!((agreement.ratio() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_roster_is_unanimous() {
        let agreement = ModelAgreement::tabulate(&result_with(Diagnosis::Benign, 80, &[]));
        assert!(agreement.is_unanimous());
        assert_eq!(agreement.ratio(), 1.0);
    }

    #[test]
    fn test_confidence_bands() {
        let formatter = ResultFormatter::new();
        assert_eq!(formatter.confidence_band(95), ConfidenceBand::High);
        assert_eq!(formatter.confidence_band(85), ConfidenceBand::High);
        assert_eq!(formatter.confidence_band(70), ConfidenceBand::Moderate);
        assert_eq!(formatter.confidence_band(55), ConfidenceBand::Low);
    }

    #[test]
    fn test_low_confidence_detection() {
        use Diagnosis::Benign;
        let formatter = ResultFormatter::new();

        let result = result_with(Benign, 60, &[Benign; 5]);
        assert!(formatter.is_low_confidence(&result));
        assert!(formatter.low_confidence_reason(&result).unwrap().contains("60%"));
    }

    #[test]
    fn test_split_roster_flagged_before_confidence() {
        use Diagnosis::{Benign, Malignant};
        let formatter = ResultFormatter::new();
        let result = result_with(Benign, 92, &[Benign, Malignant, Malignant, Malignant, Benign]);
        let reason = formatter.low_confidence_reason(&result).unwrap();
        assert!(reason.contains("3 of 5"), "reason was {}", reason);
    }

    #[test]
    fn test_high_confidence_no_reason() {
        let formatter = ResultFormatter::new();
        let result = result_with(Diagnosis::Malignant, 91, &[Diagnosis::Malignant; 5]);
        assert!(!formatter.is_low_confidence(&result));
        assert!(formatter.low_confidence_reason(&result).is_none());
    }

    #[test]
    fn test_custom_thresholds() {
        let formatter = ResultFormatter::with_config(OutputConfig {
            high_confidence: 95,
            low_confidence_threshold: 50,
            split_agreement_ratio: 0.5,
        });
        assert_eq!(formatter.confidence_band(90), ConfidenceBand::Moderate);
        let result = result_with(Diagnosis::Benign, 60, &[Diagnosis::Benign; 3]);
        assert!(!formatter.is_low_confidence(&result));
    }

    #[test]
    fn test_humanize_feature() {
        assert_eq!(humanize_feature("concave_points_worst"), "Concave Points Worst");
        assert_eq!(humanize_feature("radius_se"), "Radius Se");
        assert_eq!(humanize_feature("area"), "Area");
    }
}
