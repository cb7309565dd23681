//! Article images.
//!
//! Every article gets an image URL. When both Clipdrop and freeimage.host are
//! configured, an image is generated for the theme and uploaded; otherwise,
//! or when either step fails, a random Unsplash category URL is used.
//!
//! Image problems are logged and never fail article generation.

pub mod clipdrop;
pub mod freeimage;

use crate::config::AppConfig;
use crate::error::ImageError;
use clipdrop::ClipdropClient;
use freeimage::FreeimageClient;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{instrument, warn};

const IMAGE_CATEGORIES: [&str; 6] = ["tech", "business", "data", "office", "innovation", "startup"];

/// Unsplash URL for a random image category.
pub fn fallback_image_url<R: Rng>(rng: &mut R) -> String {
    let category = IMAGE_CATEGORIES.choose(rng).copied().unwrap_or("tech");
    format!(
        "https://source.unsplash.com/800x400/?{}",
        urlencoding::encode(category)
    )
}

/// Generates and uploads images, with a stock-photo fallback.
#[derive(Debug, Default)]
pub struct ImageSource {
    text_to_image: Option<(ClipdropClient, FreeimageClient)>,
}

impl ImageSource {
    pub fn new(text_to_image: Option<(ClipdropClient, FreeimageClient)>) -> Self {
        Self { text_to_image }
    }

    /// Build from configuration; text-to-image stays off without both keys.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let text_to_image = match config.text_to_image() {
            Some((clip, free)) => Some((ClipdropClient::new(clip)?, FreeimageClient::new(free)?)),
            None => None,
        };
        Ok(Self::new(text_to_image))
    }

    /// An image URL for an article about `theme`.
    #[instrument(level = "info", skip(self))]
    pub async fn resolve(&self, theme: &str) -> String {
        let fallback = fallback_image_url(&mut rand::rng());

        let Some((clipdrop, freeimage)) = &self.text_to_image else {
            return fallback;
        };

        match generate_and_upload(clipdrop, freeimage, theme).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, %fallback, "Image generation failed; using stock image");
                fallback
            }
        }
    }
}

async fn generate_and_upload(
    clipdrop: &ClipdropClient,
    freeimage: &FreeimageClient,
    theme: &str,
) -> Result<String, ImageError> {
    let encoded = clipdrop.generate_base64(theme).await?;
    freeimage.upload_base64(encoded).await
}
