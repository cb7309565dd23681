//! Clipdrop text-to-image client.

use crate::config::ClipdropConfig;
use crate::error::ImageError;
use crate::utils::truncate_for_log;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::multipart::Form;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug)]
pub struct ClipdropClient {
    http: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    prompt_suffix: String,
}

impl ClipdropClient {
    pub fn new(config: &ClipdropConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
            prompt_suffix: config.prompt_suffix.clone(),
        })
    }

    /// Generate an image for `prompt` and return it base64-encoded.
    #[instrument(level = "info", skip(self))]
    pub async fn generate_base64(&self, prompt: &str) -> Result<String, ImageError> {
        let prompt = format!("{prompt} {}", self.prompt_suffix).trim().to_string();
        let form = Form::new().text("prompt", prompt);

        let response = self
            .http
            .post(&self.endpoint_url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Api {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let bytes = response.bytes().await?;
        info!(bytes = bytes.len(), "Generated image");
        Ok(STANDARD.encode(&bytes))
    }
}
