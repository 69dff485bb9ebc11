//! Model performance catalog served to the dashboard
//!
//! Sample metrics for each model in the tabular and image rosters, with a
//! synthetic ROC curve derived from the AUC.

use crate::models::Modality;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of points on a synthetic ROC curve
pub const ROC_POINTS: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: u32,
    pub true_negative: u32,
    pub false_positive: u32,
    pub false_negative: u32,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u32 {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    /// True negative rate; 0 when there are no negatives
    pub fn specificity(&self) -> f64 {
        let negatives = self.true_negative + self.false_positive;
        if negatives == 0 {
            return 0.0;
        }
        self.true_negative as f64 / negatives as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

/// Metrics for one model. On the wire the roster key is authoritative for `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub name: String,
    pub accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc_roc: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub description: String,
    #[serde(default)]
    pub roc_curve: Vec<RocPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub best_model: String,
    pub best_accuracy: f64,
    pub models: Vec<String>,
    pub accuracies: Vec<f64>,
    pub f1_scores: Vec<f64>,
}

impl ModelComparison {
    /// Summarize a roster; ties keep the earlier model. `None` for an empty roster.
    pub fn from_models(models: &[ModelMetrics]) -> Option<Self> {
        let best = models.iter().fold(None::<&ModelMetrics>, |best, m| match best {
            Some(b) if b.accuracy >= m.accuracy => Some(b),
            _ => Some(m),
        })?;

        Some(Self {
            best_model: best.name.clone(),
            best_accuracy: best.accuracy,
            models: models.iter().map(|m| m.name.clone()).collect(),
            accuracies: models.iter().map(|m| m.accuracy).collect(),
            f1_scores: models.iter().map(|m| m.f1_score).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub tabular: ModelComparison,
    pub image: ModelComparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassDistribution {
    pub benign: u32,
    pub malignant: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub samples: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub classes: Vec<String>,
    pub class_distribution: ClassDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub tabular: DatasetSummary,
    pub image: DatasetSummary,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(with = "roster")]
    pub tabular_models: Vec<ModelMetrics>,
    #[serde(with = "roster")]
    pub image_models: Vec<ModelMetrics>,
    pub comparison: Comparison,
    pub dataset_info: DatasetInfo,
}

impl ModelCatalog {
    /// Built-in sample catalog
    pub fn sample() -> Self {
        let tabular_models = vec![
            metrics(
                "GRU-SVM",
                [0.967, 0.962, 0.958, 0.966, 0.989],
                [193, 357, 7, 12],
                "GRU feature extractor + SVM classifier hybrid model",
            ),
            metrics(
                "SVM RBF",
                [0.954, 0.948, 0.944, 0.952, 0.981],
                [190, 353, 11, 15],
                "Support Vector Machine with optimized RBF kernel",
            ),
            metrics(
                "Random Forest",
                [0.948, 0.941, 0.936, 0.946, 0.976],
                [188, 351, 13, 17],
                "Random Forest ensemble classifier",
            ),
            metrics(
                "Neural Network L1",
                [0.938, 0.931, 0.928, 0.934, 0.968],
                [185, 348, 16, 20],
                "Neural Network with L1 regularization for sparsity",
            ),
        ];
        let image_models = vec![
            metrics(
                "DenseNet",
                [0.938, 0.931, 0.928, 0.934, 0.972],
                [234, 421, 18, 27],
                "DenseNet-121 pretrained on ImageNet, fine-tuned on mammograms",
            ),
            metrics(
                "ViT-B",
                [0.926, 0.918, 0.912, 0.924, 0.964],
                [230, 417, 22, 31],
                "Vision Transformer Base model with patch size 16x16",
            ),
            metrics(
                "Swin Transformer",
                [0.919, 0.908, 0.902, 0.914, 0.958],
                [227, 416, 23, 34],
                "Swin Transformer with shifted window attention",
            ),
            metrics(
                "EfficientNet",
                [0.941, 0.935, 0.931, 0.939, 0.975],
                [236, 422, 17, 25],
                "EfficientNet-B4 with compound scaling",
            ),
            metrics(
                "Ensemble",
                [0.956, 0.951, 0.948, 0.954, 0.984],
                [241, 428, 11, 20],
                "Weighted ensemble of all vision models",
            ),
        ];

        // Both rosters are non-empty literals
        let comparison = Comparison {
            tabular: ModelComparison::from_models(&tabular_models)
                .unwrap_or_else(empty_comparison),
            image: ModelComparison::from_models(&image_models)
                .unwrap_or_else(empty_comparison),
        };

        let classes = vec!["Benign".to_string(), "Malignant".to_string()];
        let dataset_info = DatasetInfo {
            tabular: DatasetSummary {
                name: "Wisconsin Breast Cancer Dataset".to_string(),
                samples: 569,
                features: Some(30),
                resolution: None,
                classes: classes.clone(),
                class_distribution: ClassDistribution { benign: 357, malignant: 212 },
            },
            image: DatasetSummary {
                name: "Mammogram Image Dataset".to_string(),
                samples: 700,
                features: None,
                resolution: Some("224x224".to_string()),
                classes,
                class_distribution: ClassDistribution { benign: 439, malignant: 261 },
            },
        };

        Self {
            tabular_models,
            image_models,
            comparison,
            dataset_info,
        }
    }

    pub fn models(&self, modality: Modality) -> &[ModelMetrics] {
        match modality {
            Modality::Tabular => &self.tabular_models,
            Modality::Image => &self.image_models,
        }
    }

    pub fn find(&self, name: &str) -> Option<&ModelMetrics> {
        self.tabular_models
            .iter()
            .chain(self.image_models.iter())
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

fn metrics(name: &str, scores: [f64; 5], cm: [u32; 4], description: &str) -> ModelMetrics {
    let [accuracy, f1_score, precision, recall, auc_roc] = scores;
    let [true_positive, true_negative, false_positive, false_negative] = cm;
    ModelMetrics {
        name: name.to_string(),
        accuracy,
        f1_score,
        precision,
        recall,
        auc_roc,
        confusion_matrix: ConfusionMatrix {
            true_positive,
            true_negative,
            false_positive,
            false_negative,
        },
        description: description.to_string(),
        roc_curve: roc_curve(auc_roc),
    }
}

fn empty_comparison() -> ModelComparison {
    ModelComparison {
        best_model: String::new(),
        best_accuracy: 0.0,
        models: Vec::new(),
        accuracies: Vec::new(),
        f1_scores: Vec::new(),
    }
}

/// Synthetic ROC curve: `tpr = 1 - (1 - fpr)^(1 / auc^2)`, rounded to 4 places
pub fn roc_curve(auc: f64) -> Vec<RocPoint> {
    let power = 1.0 / (auc * auc);
    (0..ROC_POINTS)
        .map(|i| {
            let fpr = i as f64 / (ROC_POINTS - 1) as f64;
            let tpr = (1.0 - (1.0 - fpr).powf(power)).clamp(0.0, 1.0);
            RocPoint {
                fpr: round4(fpr),
                tpr: round4(tpr),
            }
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// Rosters travel as JSON objects keyed by model name, in display order.
mod roster {
    use super::*;

    pub fn serialize<S: Serializer>(models: &[ModelMetrics], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(models.len()))?;
        for model in models {
            map.serialize_entry(&model.name, model)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ModelMetrics>, D::Error> {
        struct RosterVisitor;

        impl<'de> Visitor<'de> for RosterVisitor {
            type Value = Vec<ModelMetrics>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of model name to metrics")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut models = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, mut model)) = access.next_entry::<String, ModelMetrics>()? {
                    model.name = name;
                    models.push(model);
                }
                Ok(models)
            }
        }

        deserializer.deserialize_map(RosterVisitor)
    }
}
