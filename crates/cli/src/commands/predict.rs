//! Prediction commands

use anyhow::{bail, Context, Result};
use colored::Colorize;
use diagnosis_lib::predictor::{humanize_feature, ModelAgreement, ResultFormatter};
use diagnosis_lib::{Diagnosed, DiagnosisService, FeatureVector, ImageDescriptor};
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_confidence, color_diagnosis, eprint_warning, print_info, print_json, print_table,
    print_warning, OutputFormat,
};

/// Number of importance rows shown in table output
const IMPORTANCE_ROWS: usize = 10;

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Prediction")]
    prediction: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

#[derive(Tabled)]
struct ImportanceRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

/// Parse a `name=value` feature assignment
pub fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {}: {}", name.trim(), e))?;
    Ok((name.trim().to_string(), value))
}

/// Start from the input file (or the reference case) and apply assignments
pub fn load_features(input: Option<&Path>, assignments: &[(String, f64)]) -> Result<FeatureVector> {
    let mut features = match input {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid feature JSON in {}", path.display()))?
        }
        None => FeatureVector::reference(),
    };

    for (name, value) in assignments {
        if !features.set(name, *value) {
            bail!("Unknown feature '{}'. Run `dx features` for the list", name);
        }
    }
    Ok(features)
}

pub async fn predict_tabular(
    service: &DiagnosisService,
    features: &FeatureVector,
    format: OutputFormat,
) -> Result<()> {
    let warnings = range_warnings(features);
    let diagnosed = service.predict_tabular(features).await;

    match format {
        OutputFormat::Json => {
            warnings.iter().for_each(|w| eprint_warning(w));
            print_json(&diagnosed)?;
        }
        OutputFormat::Table => {
            warnings.iter().for_each(|w| print_warning(w));
            render(&diagnosed);
        }
    }
    Ok(())
}

/// One line per feature outside its dataset range
fn range_warnings(features: &FeatureVector) -> Vec<String> {
    features
        .range_violations()
        .iter()
        .map(|v| {
            format!(
                "{} = {} is outside the dataset range [{}, {}]",
                v.feature, v.value, v.min, v.max
            )
        })
        .collect()
}

pub async fn predict_image(
    service: &DiagnosisService,
    path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mut image = ImageDescriptor::new(name, bytes);
    if let Some(content_type) = content_type_for(path) {
        image = image.with_content_type(content_type);
    }

    let diagnosed = service.predict_image(&image).await;
    match format {
        OutputFormat::Json => print_json(&diagnosed)?,
        OutputFormat::Table => render(&diagnosed),
    }
    Ok(())
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

fn render(diagnosed: &Diagnosed) {
    let result = &diagnosed.result;
    let formatter = ResultFormatter::new();
    let band = formatter.confidence_band(result.confidence);
    let agreement = ModelAgreement::tabulate(result);

    println!("{}", "Prediction Result".bold());
    println!("{}", "=".repeat(60));
    println!("Diagnosis:   {}", color_diagnosis(result.final_prediction));
    println!(
        "Confidence:  {} ({})",
        color_confidence(result.confidence, band),
        band.as_str()
    );
    println!(
        "Agreement:   {} of {} models",
        agreement.agreeing, agreement.total
    );
    if let Some(reason) = formatter.low_confidence_reason(result) {
        print_warning(&reason);
    }
    println!();

    let rows = result
        .model_predictions
        .iter()
        .map(|m| ModelRow {
            model: m.model.clone(),
            prediction: color_diagnosis(m.prediction),
            confidence: color_confidence(m.confidence, formatter.confidence_band(m.confidence)),
        })
        .collect();
    print_table(rows);

    if let Some(importance) = &result.feature_importance {
        let mut values: Vec<_> = importance.values.iter().collect();
        values.sort_by(|a, b| b.1.total_cmp(a.1));
        let rows = values
            .into_iter()
            .take(IMPORTANCE_ROWS)
            .map(|(name, weight)| ImportanceRow {
                feature: humanize_feature(name),
                importance: format!("{:.3}", weight),
            })
            .collect();
        println!();
        print_table(rows);
        print_info(&importance.summary);
    }

    if let Some(explanation) = &result.explanation {
        print_info(explanation);
    }

    println!();
    println!(
        "Prediction ID: {}   {}",
        result.prediction_id.cyan(),
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
