//! Backend connection for CLI commands

use anyhow::{Context, Result};
use diagnosis_lib::{ApiClient, DiagnosisService, PredictionSimulator};

use crate::config::Settings;

/// Build an API client unless running offline
pub fn connect(settings: &Settings) -> Result<Option<ApiClient>> {
    if settings.offline {
        return Ok(None);
    }
    let client = ApiClient::new(&settings.api_url, settings.timeout)
        .with_context(|| format!("Invalid API URL: {}", settings.api_url))?;
    Ok(Some(client))
}

/// Prediction service with optional seeded simulator
pub fn service(settings: &Settings, seed: Option<u64>) -> Result<DiagnosisService> {
    let mut service = DiagnosisService::new(connect(settings)?).with_timeout(settings.timeout);
    if let Some(seed) = seed {
        service = service.with_simulator(PredictionSimulator::seeded(seed));
    }
    Ok(service)
}
