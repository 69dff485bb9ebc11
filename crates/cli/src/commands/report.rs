//! Report download

use anyhow::{Context, Result};
use diagnosis_lib::{ApiClient, DiagnosisMetrics, StructuredLogger};
use std::path::{Path, PathBuf};

use crate::output::{print_success, print_warning};

/// Shown when a report cannot be fetched; the command still succeeds
pub const REPORT_UNAVAILABLE: &str = "Report download is available when connected to the backend API";

pub fn default_output(prediction_id: &str) -> PathBuf {
    PathBuf::from(format!("diagnosis_report_{}.pdf", prediction_id))
}

pub async fn download_report(
    client: Option<&ApiClient>,
    prediction_id: &str,
    output: &Path,
) -> Result<()> {
    let logger = StructuredLogger::new("dx");
    let metrics = DiagnosisMetrics::new();

    let Some(client) = client else {
        logger.log_report_failure(prediction_id, "offline");
        metrics.inc_report_failures();
        print_warning(REPORT_UNAVAILABLE);
        return Ok(());
    };

    match client.generate_report(prediction_id).await {
        Ok(bytes) => {
            std::fs::write(output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_success(&format!(
                "Saved report to {} ({} bytes)",
                output.display(),
                bytes.len()
            ));
        }
        Err(e) => {
            logger.log_report_failure(prediction_id, &e.to_string());
            metrics.inc_report_failures();
            print_warning(REPORT_UNAVAILABLE);
        }
    }
    Ok(())
}
