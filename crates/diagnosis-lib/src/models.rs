//! Core data models for the diagnosis engine

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of cell-nucleus measurements in a tabular case
pub const NUM_FEATURES: usize = 30;

macro_rules! feature_vector {
    ($($name:ident),+ $(,)?) => {
        /// Feature vector for a tabular case (Wisconsin dataset schema)
        ///
        /// Keys missing from a request deserialize as `0.0`.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct FeatureVector {
            $(pub $name: f64,)+
        }

        impl FeatureVector {
            /// Feature names in canonical order (mean, standard error, worst)
            pub const NAMES: [&'static str; NUM_FEATURES] = [$(stringify!($name)),+];

            /// Look up a feature by name
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($name) => Some(self.$name),)+
                    _ => None,
                }
            }

            /// Set a feature by name, returns false for unknown names
            pub fn set(&mut self, name: &str, value: f64) -> bool {
                match name {
                    $(stringify!($name) => {
                        self.$name = value;
                        true
                    })+
                    _ => false,
                }
            }

            /// Iterate over `(name, value)` pairs in canonical order
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
                [$((stringify!($name), self.$name)),+].into_iter()
            }
        }
    };
}

feature_vector!(
    radius_mean,
    texture_mean,
    perimeter_mean,
    area_mean,
    smoothness_mean,
    compactness_mean,
    concavity_mean,
    concave_points_mean,
    symmetry_mean,
    fractal_dimension_mean,
    radius_se,
    texture_se,
    perimeter_se,
    area_se,
    smoothness_se,
    compactness_se,
    concavity_se,
    concave_points_se,
    symmetry_se,
    fractal_dimension_se,
    radius_worst,
    texture_worst,
    perimeter_worst,
    area_worst,
    smoothness_worst,
    compactness_worst,
    concavity_worst,
    concave_points_worst,
    symmetry_worst,
    fractal_dimension_worst,
);

/// Diagnosis label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Benign,
    Malignant,
}

impl Diagnosis {
    pub fn from_malignant(is_malignant: bool) -> Self {
        if is_malignant {
            Diagnosis::Malignant
        } else {
            Diagnosis::Benign
        }
    }

    pub fn is_malignant(&self) -> bool {
        matches!(self, Diagnosis::Malignant)
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Benign => f.write_str("Benign"),
            Diagnosis::Malignant => f.write_str("Malignant"),
        }
    }
}

/// Input modality of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Tabular,
    Image,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Tabular => "tabular",
            Modality::Image => "image",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single model's verdict inside a result roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub model: String,
    pub prediction: Diagnosis,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
}

/// Per-feature contribution weights for a tabular result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub values: BTreeMap<String, f64>,
    pub top_features: Vec<String>,
    pub summary: String,
}

/// Multi-model diagnosis result, shared by remote and simulated predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction_id: String,
    pub final_prediction: Diagnosis,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    pub model_predictions: Vec<ModelPrediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<FeatureImportance>,
    /// Absent on tabular results; an image result carries the key, `null`
    /// when no overlay was produced
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub heatmap_base64: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Opaque image payload handed to the image predictor
///
/// The pixel content is never inspected.
#[derive(Clone)]
pub struct ImageDescriptor {
    pub name: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl ImageDescriptor {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDescriptor")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Round and clamp a raw confidence to the 0-100 display range
pub fn clamp_confidence(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

// The real backend reports confidence as a float with two decimals.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_confidence(raw))
}

// Accepts RFC 3339 as well as naive ISO-8601 timestamps, which are taken as UTC.
/// Marks a key as present even when its value is `null`
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
