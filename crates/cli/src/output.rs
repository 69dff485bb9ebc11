//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use diagnosis_lib::predictor::ConfidenceBand;
use diagnosis_lib::Diagnosis;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn parse_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows with the rounded table style
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a warning to stderr, keeping stdout machine-readable
pub fn eprint_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Color a diagnosis label
pub fn color_diagnosis(diagnosis: Diagnosis) -> String {
    match diagnosis {
        Diagnosis::Benign => diagnosis.to_string().green().bold().to_string(),
        Diagnosis::Malignant => diagnosis.to_string().red().bold().to_string(),
    }
}

/// Color a confidence value by its band
pub fn color_confidence(confidence: u8, band: ConfidenceBand) -> String {
    let formatted = format!("{}%", confidence);
    match band {
        ConfidenceBand::High => formatted.green().to_string(),
        ConfidenceBand::Moderate => formatted.yellow().to_string(),
        ConfidenceBand::Low => formatted.red().to_string(),
    }
}
