//! HTTP client for the remote inference API

use crate::catalog::ModelCatalog;
use crate::error::ClientError;
use crate::models::{FeatureVector, ImageDescriptor, PredictionResult};
use crate::predictor::PredictionBackend;
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default backend address used by the web frontend
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub struct ApiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        let mut base_url = Url::parse(base_url)?;
        // Keep any path prefix when joining relative endpoints
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the PDF report for a stored prediction
    pub async fn generate_report(&self, prediction_id: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.base_url.join("api/report/generate")?;
        let request = self
            .client
            .post(url)
            .query(&[("prediction_id", prediction_id)]);
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(bytes.to_vec())
    }

    pub async fn model_metrics(&self) -> Result<ModelCatalog, ClientError> {
        let url = self.base_url.join("api/metrics")?;
        self.fetch(self.client.get(url)).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Backend responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Http(e)
        }
    }
}

#[async_trait]
impl PredictionBackend for ApiClient {
    async fn predict_tabular(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionResult, ClientError> {
        let url = self.base_url.join("api/predict/tabular")?;
        self.fetch(self.client.post(url).json(features)).await
    }

    async fn predict_image(&self, image: &ImageDescriptor) -> Result<PredictionResult, ClientError> {
        let url = self.base_url.join("api/predict/image")?;

        let mut part = multipart::Part::bytes(image.bytes.clone()).file_name(image.name.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        self.fetch(self.client.post(url).multipart(form)).await
    }
}
