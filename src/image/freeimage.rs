//! freeimage.host upload client.

use crate::config::FreeimageConfig;
use crate::error::ImageError;
use reqwest::multipart::Form;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    status_code: Option<u16>,
    status_txt: Option<String>,
    image: Option<UploadedImage>,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: Option<String>,
}

#[derive(Debug)]
pub struct FreeimageClient {
    http: reqwest::Client,
    endpoint_url: String,
    api_key: String,
}

impl FreeimageClient {
    pub fn new(config: &FreeimageConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Upload a base64-encoded image and return its public URL.
    #[instrument(level = "info", skip_all)]
    pub async fn upload_base64(&self, base64_image: String) -> Result<String, ImageError> {
        let form = Form::new()
            .text("key", self.api_key.clone())
            .text("action", "upload")
            .text("source", base64_image)
            .text("format", "json");

        let body = self
            .http
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;

        let parsed: UploadResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!(error = %e, "Upload response is not JSON");
            UploadResponse::default()
        });

        match parsed {
            UploadResponse {
                status_code: Some(200),
                image: Some(UploadedImage { url: Some(url) }),
                ..
            } => {
                info!(%url, "Image uploaded");
                Ok(url)
            }
            UploadResponse { status_txt, .. } => Err(ImageError::Upload(
                status_txt.unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}
