//! Dashboard, glossary and feature table commands

use anyhow::Result;
use colored::Colorize;
use diagnosis_lib::catalog::ModelCatalog;
use diagnosis_lib::glossary::Glossary;
use diagnosis_lib::predictor::{FeatureGroup, FEATURE_SPECS};
use diagnosis_lib::{ApiClient, Modality};
use tabled::Tabled;
use tracing::debug;

use crate::output::{format_percent, print_json, print_table, print_warning, OutputFormat};

#[derive(Tabled)]
struct MetricsRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "F1")]
    f1_score: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "AUC")]
    auc_roc: String,
    #[tabled(rename = "Specificity")]
    specificity: String,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Min")]
    min: f64,
    #[tabled(rename = "Max")]
    max: f64,
    #[tabled(rename = "Default")]
    default: f64,
}

/// Fetch the catalog from the backend, falling back to the built-in sample
pub async fn fetch_catalog(client: Option<&ApiClient>) -> ModelCatalog {
    if let Some(client) = client {
        match client.model_metrics().await {
            Ok(catalog) => return catalog,
            Err(e) => debug!(error = %e, "Metrics unavailable, using sample catalog"),
        }
    }
    ModelCatalog::sample()
}

pub async fn show_metrics(
    client: Option<&ApiClient>,
    modality: Option<Modality>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = fetch_catalog(client).await;

    if format == OutputFormat::Json {
        return match modality {
            Some(m) => print_json(catalog.models(m)),
            None => print_json(&catalog),
        };
    }

    let modalities = match modality {
        Some(m) => vec![m],
        None => vec![Modality::Tabular, Modality::Image],
    };

    for modality in modalities {
        let (comparison, dataset) = match modality {
            Modality::Tabular => (&catalog.comparison.tabular, &catalog.dataset_info.tabular),
            Modality::Image => (&catalog.comparison.image, &catalog.dataset_info.image),
        };

        println!("{}", format!("{} models", capitalize(modality.as_str())).bold());
        println!(
            "Dataset: {} ({} samples, {} benign / {} malignant)",
            dataset.name,
            dataset.samples,
            dataset.class_distribution.benign,
            dataset.class_distribution.malignant
        );

        let rows = catalog
            .models(modality)
            .iter()
            .map(|m| MetricsRow {
                model: if m.name == comparison.best_model {
                    m.name.green().bold().to_string()
                } else {
                    m.name.clone()
                },
                accuracy: format_percent(m.accuracy),
                f1_score: format_percent(m.f1_score),
                precision: format_percent(m.precision),
                recall: format_percent(m.recall),
                auc_roc: format!("{:.3}", m.auc_roc),
                specificity: format_percent(m.confusion_matrix.specificity()),
            })
            .collect();
        print_table(rows);
        println!(
            "Best: {} ({})\n",
            comparison.best_model.cyan(),
            format_percent(comparison.best_accuracy)
        );
    }
    Ok(())
}

pub fn show_glossary(query: Option<&str>, term: Option<&str>, format: OutputFormat) -> Result<()> {
    if let Some(term) = term {
        let Some(entry) = Glossary::lookup(term) else {
            print_warning(&format!("No glossary entry for '{}'", term));
            return Ok(());
        };
        return match format {
            OutputFormat::Json => print_json(entry),
            OutputFormat::Table => {
                println!("{}", entry.term.bold());
                println!("{}", entry.definition);
                if !entry.related.is_empty() {
                    println!("Related: {}", entry.related.join(", ").cyan());
                }
                Ok(())
            }
        };
    }

    let matches = Glossary::search(query.unwrap_or(""));
    if format == OutputFormat::Json {
        return print_json(&matches);
    }
    if matches.is_empty() {
        print_warning("No matching terms");
        return Ok(());
    }

    for category in matches {
        println!(
            "{} ({} terms)",
            category.category.bold(),
            category.terms.len()
        );
        for entry in category.terms {
            println!("  {} - {}", entry.term.cyan(), entry.definition);
        }
        println!();
    }
    Ok(())
}

pub fn show_features(format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&FEATURE_SPECS[..]);
    }

    for group in [FeatureGroup::Mean, FeatureGroup::StandardError, FeatureGroup::Worst] {
        println!("{}", group.title().bold());
        let rows = FEATURE_SPECS
            .iter()
            .filter(|spec| spec.group == group)
            .map(|spec| FeatureRow {
                name: spec.name,
                label: spec.label,
                min: spec.min,
                max: spec.max,
                default: spec.default,
            })
            .collect();
        print_table(rows);
        println!();
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_catalog_is_sample() {
        let catalog = fetch_catalog(None).await;
        assert_eq!(catalog, ModelCatalog::sample());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("tabular"), "Tabular");
        assert_eq!(capitalize(""), "");
    }
}
