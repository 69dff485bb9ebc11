//! Feature table and malignancy scoring for tabular cases
//!
//! Ranges and defaults are derived from the Wisconsin breast cancer dataset.
//! The score is a weighted sum of five min-max normalized features and is
//! used only by the simulator; it is not a calibrated model.

use crate::models::{FeatureVector, NUM_FEATURES};
use serde::Serialize;

/// Score above which a tabular case is labelled malignant
pub const MALIGNANCY_THRESHOLD: f64 = 0.45;

/// Measurement variant a feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Mean,
    StandardError,
    Worst,
}

impl FeatureGroup {
    pub fn title(&self) -> &'static str {
        match self {
            FeatureGroup::Mean => "Mean Features",
            FeatureGroup::StandardError => "SE Features (Standard Error)",
            FeatureGroup::Worst => "Worst Features",
        }
    }
}

/// Static description of one input feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub group: FeatureGroup,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FeatureSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        group: FeatureGroup,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            group,
            min,
            max,
            default,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

use FeatureGroup::{Mean, StandardError, Worst};

/// All 30 features in canonical order
pub const FEATURE_SPECS: [FeatureSpec; NUM_FEATURES] = [
    FeatureSpec::new("radius_mean", "Radius Mean", Mean, 6.98, 28.11, 14.1),
    FeatureSpec::new("texture_mean", "Texture Mean", Mean, 9.71, 39.28, 19.3),
    FeatureSpec::new("perimeter_mean", "Perimeter Mean", Mean, 43.79, 188.5, 92.0),
    FeatureSpec::new("area_mean", "Area Mean", Mean, 143.5, 2501.0, 654.9),
    FeatureSpec::new("smoothness_mean", "Smoothness Mean", Mean, 0.053, 0.163, 0.096),
    FeatureSpec::new("compactness_mean", "Compactness Mean", Mean, 0.019, 0.345, 0.104),
    FeatureSpec::new("concavity_mean", "Concavity Mean", Mean, 0.0, 0.427, 0.089),
    FeatureSpec::new("concave_points_mean", "Concave Points Mean", Mean, 0.0, 0.201, 0.049),
    FeatureSpec::new("symmetry_mean", "Symmetry Mean", Mean, 0.106, 0.304, 0.181),
    FeatureSpec::new("fractal_dimension_mean", "Fractal Dim. Mean", Mean, 0.05, 0.097, 0.063),
    FeatureSpec::new("radius_se", "Radius SE", StandardError, 0.112, 2.873, 0.405),
    FeatureSpec::new("texture_se", "Texture SE", StandardError, 0.36, 4.885, 1.217),
    FeatureSpec::new("perimeter_se", "Perimeter SE", StandardError, 0.757, 21.98, 2.866),
    FeatureSpec::new("area_se", "Area SE", StandardError, 6.8, 542.2, 40.34),
    FeatureSpec::new("smoothness_se", "Smoothness SE", StandardError, 0.002, 0.031, 0.007),
    FeatureSpec::new("compactness_se", "Compactness SE", StandardError, 0.002, 0.135, 0.025),
    FeatureSpec::new("concavity_se", "Concavity SE", StandardError, 0.0, 0.396, 0.032),
    FeatureSpec::new("concave_points_se", "Concave Points SE", StandardError, 0.0, 0.053, 0.012),
    FeatureSpec::new("symmetry_se", "Symmetry SE", StandardError, 0.008, 0.079, 0.021),
    FeatureSpec::new("fractal_dimension_se", "Fractal Dim. SE", StandardError, 0.001, 0.03, 0.004),
    FeatureSpec::new("radius_worst", "Radius Worst", Worst, 7.93, 36.04, 16.27),
    FeatureSpec::new("texture_worst", "Texture Worst", Worst, 12.02, 49.54, 25.68),
    FeatureSpec::new("perimeter_worst", "Perimeter Worst", Worst, 50.41, 251.2, 107.3),
    FeatureSpec::new("area_worst", "Area Worst", Worst, 185.2, 4254.0, 880.6),
    FeatureSpec::new("smoothness_worst", "Smoothness Worst", Worst, 0.071, 0.223, 0.132),
    FeatureSpec::new("compactness_worst", "Compactness Worst", Worst, 0.027, 1.058, 0.254),
    FeatureSpec::new("concavity_worst", "Concavity Worst", Worst, 0.0, 1.252, 0.272),
    FeatureSpec::new("concave_points_worst", "Concave Points Worst", Worst, 0.0, 0.291, 0.115),
    FeatureSpec::new("symmetry_worst", "Symmetry Worst", Worst, 0.157, 0.664, 0.29),
    FeatureSpec::new("fractal_dimension_worst", "Fractal Dim. Worst", Worst, 0.055, 0.208, 0.084),
];

/// Look up the table entry for a feature name
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURE_SPECS.iter().find(|spec| spec.name == name)
}

/// A value outside the dataset range of its feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeViolation {
    pub feature: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureVector {
    /// Vector filled with the dataset reference values
    pub fn reference() -> Self {
        let mut features = FeatureVector::default();
        for spec in FEATURE_SPECS.iter() {
            features.set(spec.name, spec.default);
        }
        features
    }

    /// Vector with every feature at its dataset minimum
    pub fn minimum() -> Self {
        let mut features = FeatureVector::default();
        for spec in FEATURE_SPECS.iter() {
            features.set(spec.name, spec.min);
        }
        features
    }

    /// Features outside their known range. Advisory only.
    pub fn range_violations(&self) -> Vec<RangeViolation> {
        FEATURE_SPECS
            .iter()
            .filter_map(|spec| {
                let value = self.get(spec.name)?;
                (!spec.contains(value)).then_some(RangeViolation {
                    feature: spec.name,
                    value,
                    min: spec.min,
                    max: spec.max,
                })
            })
            .collect()
    }
}

/// Weighted malignancy score over five normalized features
///
/// Not clamped: out-of-range inputs can push it below 0 or above 1.
pub fn malignancy_score(features: &FeatureVector) -> f64 {
    0.15 * normalize_range(features.radius_mean, 6.98, 28.11)
        + 0.20 * normalize_max(features.concave_points_mean, 0.201)
        + 0.25 * normalize_range(features.area_worst, 185.2, 4254.0)
        + 0.20 * normalize_max(features.concavity_worst, 1.252)
        + 0.20 * normalize_range(features.perimeter_worst, 50.41, 251.2)
}

fn normalize_range(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

fn normalize_max(value: f64, max: f64) -> f64 {
    value / max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_risk_features() -> FeatureVector {
        FeatureVector {
            radius_mean: 28.0,
            area_worst: 4200.0,
            concave_points_mean: 0.2,
            concavity_worst: 1.2,
            perimeter_worst: 250.0,
            ..FeatureVector::reference()
        }
    }

    #[test]
    fn test_table_matches_vector_order() {
        let names: Vec<_> = FEATURE_SPECS.iter().map(|s| s.name).collect();
        assert_eq!(names, FeatureVector::NAMES.to_vec());
    }

    #[test]
    fn test_defaults_within_range() {
        for spec in FEATURE_SPECS.iter() {
            assert!(spec.min < spec.max, "{} has an empty range", spec.name);
            assert!(spec.contains(spec.default), "{} default out of range", spec.name);
        }
    }

    #[test]
    fn test_high_risk_score_is_malignant() {
        let score = malignancy_score(&high_risk_features());
        assert!(score > MALIGNANCY_THRESHOLD, "score was {}", score);
        assert!((score - 0.985).abs() < 0.01, "score was {}", score);
    }

    #[test]
    fn test_minimum_score_is_zero() {
        let score = malignancy_score(&FeatureVector::minimum());
        assert!(score.abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_reference_score_is_benign() {
        let score = malignancy_score(&FeatureVector::reference());
        assert!(score < MALIGNANCY_THRESHOLD, "score was {}", score);
    }

    #[test]
    fn test_missing_features_score_below_zero() {
        // Zeroed range-normalized terms go negative
        let score = malignancy_score(&FeatureVector::default());
        assert!(score < 0.0);
    }

    #[test]
    fn test_range_violations() {
        assert!(FeatureVector::reference().range_violations().is_empty());

        let mut features = FeatureVector::reference();
        features.radius_mean = 40.0;
        features.smoothness_se = -0.1;
        let violations = features.range_violations();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].feature, "radius_mean");
        assert_eq!(violations[0].max, 28.11);
        assert_eq!(violations[1].feature, "smoothness_se");
    }

    #[test]
    fn test_feature_spec_lookup() {
        let spec = feature_spec("area_worst").unwrap();
        assert_eq!(spec.group, FeatureGroup::Worst);
        assert_eq!(spec.label, "Area Worst");
        assert!(feature_spec("area").is_none());
    }
}
