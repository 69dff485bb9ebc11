//! Breast cancer diagnosis demo CLI
//!
//! Runs predictions against the backend API, falling back to the local
//! simulator when it is unreachable, and browses the model catalog and
//! glossary.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{catalog, predict, report};
use diagnosis_lib::Modality;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Breast cancer diagnosis demo CLI
#[derive(Parser)]
#[command(name = "dx")]
#[command(author, version, about = "CLI for the Breast Cancer Diagnosis demo", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via DX_API_URL env var)
    #[arg(long, env = "DX_API_URL")]
    pub api_url: Option<String>,

    /// Remote prediction timeout in seconds
    #[arg(long, env = "DX_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Never contact the backend; always simulate
    #[arg(long)]
    pub offline: bool,

    /// Seed for reproducible simulated predictions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a diagnosis prediction
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Download the PDF report for a prediction
    Report {
        /// Prediction ID
        id: String,

        /// Output file (default: diagnosis_report_<id>.pdf)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show model performance metrics
    Metrics {
        /// Only show one roster
        #[arg(long, short)]
        modality: Option<ModalityArg>,
    },

    /// Search the glossary
    Glossary {
        /// Text to search for in terms and definitions
        query: Option<String>,

        /// Look up a single term exactly
        #[arg(long, conflicts_with = "query")]
        term: Option<String>,
    },

    /// List the tabular input features and their ranges
    Features,
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict from the 30 cell-nucleus measurements
    Tabular {
        /// JSON file with feature values (missing keys are 0)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Override a feature, e.g. --set radius_mean=17.5
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = predict::parse_assignment)]
        assignments: Vec<(String, f64)>,
    },

    /// Predict from a mammogram image
    Image {
        /// Image file
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModalityArg {
    Tabular,
    Image,
}

impl From<ModalityArg> for Modality {
    fn from(arg: ModalityArg) -> Self {
        match arg {
            ModalityArg::Tabular => Modality::Tabular,
            ModalityArg::Image => Modality::Image,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let settings = config::Settings::resolve(
        config::Overrides {
            api_url: cli.api_url,
            timeout_secs: cli.timeout,
            offline: cli.offline,
            format: cli.format,
        },
        config::Config::load()?,
    );
    let format = settings.format;

    match cli.command {
        Commands::Predict(predict_cmd) => {
            let service = client::service(&settings, cli.seed)?;
            match predict_cmd {
                PredictCommands::Tabular { input, assignments } => {
                    let features = predict::load_features(input.as_deref(), &assignments)?;
                    predict::predict_tabular(&service, &features, format).await?;
                }
                PredictCommands::Image { path } => {
                    predict::predict_image(&service, &path, format).await?;
                }
            }
        }
        Commands::Report { id, output } => {
            let api = client::connect(&settings)?;
            let output = output.unwrap_or_else(|| report::default_output(&id));
            report::download_report(api.as_ref(), &id, &output).await?;
        }
        Commands::Metrics { modality } => {
            let api = client::connect(&settings)?;
            catalog::show_metrics(api.as_ref(), modality.map(Modality::from), format).await?;
        }
        Commands::Glossary { query, term } => {
            catalog::show_glossary(query.as_deref(), term.as_deref(), format)?;
        }
        Commands::Features => {
            catalog::show_features(format)?;
        }
    }

    Ok(())
}
