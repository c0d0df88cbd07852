//! Azure Computer Vision client — image description and tags.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use eduaccess_core::types::VisionAnalysis;

use crate::config::{ConfigError, Settings, VisionCredentials};

const ANALYZE_PATH: &str = "/vision/v3.2/analyze";
const VISUAL_FEATURES: &str = "Description,Tags";
const LANGUAGE: &str = "en";

/// What to analyze: a publicly reachable URL or raw image bytes.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
}

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, source: ImageSource) -> Result<VisionAnalysis, VisionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("image analysis request failed: {0}")]
    Request(String),
    #[error("Image analysis failed: {0}")]
    Upstream(String),
    #[error("invalid image analysis response: {0}")]
    InvalidResponse(String),
}

pub struct AzureVisionClient {
    client: reqwest::Client,
    credentials: Option<VisionCredentials>,
}

impl AzureVisionClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: settings.vision.clone(),
        }
    }

    fn credentials(&self) -> Result<&VisionCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::Missing("Azure Image Analysis key or endpoint"))
    }
}

#[async_trait]
impl ImageAnalyzer for AzureVisionClient {
    async fn analyze(&self, source: ImageSource) -> Result<VisionAnalysis, VisionError> {
        let creds = self.credentials()?;
        let url = format!("{}{ANALYZE_PATH}", creds.endpoint);

        let req = self
            .client
            .post(&url)
            .query(&[("visualFeatures", VISUAL_FEATURES), ("language", LANGUAGE)])
            .header("Ocp-Apim-Subscription-Key", &creds.key);

        let req = match source {
            ImageSource::Url(image_url) => {
                debug!(%image_url, "analyzing image by url");
                req.json(&serde_json::json!({ "url": image_url }))
            }
            ImageSource::Bytes(bytes) => {
                debug!(bytes = bytes.len(), "analyzing uploaded image");
                req.header(CONTENT_TYPE, "application/octet-stream").body(bytes)
            }
        };

        let resp = req
            .send()
            .await
            .map_err(|e| VisionError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VisionError::Upstream(format!("{status}: {body}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| VisionError::Request(format!("response read error: {e}")))?;
        let analysis: VisionAnalysis = serde_json::from_str(&body)
            .map_err(|e| VisionError::InvalidResponse(format!("{e}; raw={body}")))?;

        info!(
            captions = analysis.description.captions.len(),
            tags = analysis.tags.len(),
            "image analysis completed"
        );
        Ok(analysis)
    }
}
