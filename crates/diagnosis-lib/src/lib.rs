//! Diagnosis engine for the breast cancer demo
//!
//! This crate provides the core functionality for:
//! - Mock multi-model predictions for tabular and image cases
//! - Remote-first prediction with simulator fallback
//! - The model performance catalog and glossary
//! - Prediction history and observability

pub mod catalog;
pub mod client;
pub mod error;
pub mod glossary;
pub mod history;
pub mod models;
pub mod observability;
pub mod predictor;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ClientError;
pub use models::*;
pub use observability::{DiagnosisMetrics, StructuredLogger};
pub use predictor::{
    Diagnosed, DiagnosisService, PredictionBackend, PredictionSimulator, PredictionSource,
};
