//! Application configuration.
//!
//! Configuration is read from a YAML file and then overlaid with values given
//! on the command line or through environment variables (see [`crate::cli`]).
//! Each collaborator receives only its own section.
//!
//! # Example
//!
//! ```yaml
//! site:
//!   company_name: Doterb
//!   company_url: https://doterb.com
//! gemini:
//!   api_key: "..."
//! wordpress:
//!   api_url: https://doterb.com/wp-json/wp/v2/posts
//!   username: admin
//!   app_password: "..."
//! pipeline:
//!   max_attempts: 10
//!   publish_status: publish
//!   themes_file: themes.txt
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::pipeline::PipelineConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// The company the generated articles are written for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub company_name: String,
    pub company_url: String,
    pub company_description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            company_name: "Doterb".to_string(),
            company_url: "https://doterb.com".to_string(),
            company_description: "a web development and IT solutions company providing website \
                                  creation, system integration, and digital transformation services"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub endpoint_url: String,
    pub timeout_secs: u64,
    /// Transport retries per `generate()` call.
    pub max_retries: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
                .to_string(),
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClipdropConfig {
    pub api_key: String,
    pub endpoint_url: String,
    /// Appended to the theme to form the image prompt.
    pub prompt_suffix: String,
    pub timeout_secs: u64,
}

impl Default for ClipdropConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint_url: "https://clipdrop-api.co/text-to-image/v1".to_string(),
            prompt_suffix: "di indonesia".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FreeimageConfig {
    pub api_key: String,
    pub endpoint_url: String,
    pub timeout_secs: u64,
}

impl Default for FreeimageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint_url: "https://freeimage.host/api/1/upload".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordPressConfig {
    /// The posts collection endpoint, e.g. `https://example.com/wp-json/wp/v2/posts`.
    pub api_url: String,
    pub username: String,
    pub app_password: String,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    /// Post meta key that receives the focus keyword (Yoast or Rank Math).
    pub seo_focus_keyword_field: String,
    pub timeout_secs: u64,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            username: "admin".to_string(),
            app_password: String::new(),
            categories: vec![1],
            tags: vec![39],
            seo_focus_keyword_field: "_yoast_wpseo_focuskw".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSection {
    pub max_attempts: u32,
    pub publish_status: String,
    pub themes_file: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            max_attempts: pipeline.max_attempts,
            publish_status: pipeline.publish_status,
            themes_file: "themes.txt".to_string(),
        }
    }
}

impl PipelineSection {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_attempts: self.max_attempts,
            publish_status: self.publish_status.clone(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub gemini: GeminiConfig,
    /// Text-to-image is used only when both image sections carry a key.
    pub clipdrop: Option<ClipdropConfig>,
    pub freeimage: Option<FreeimageConfig>,
    pub wordpress: WordPressConfig,
    pub pipeline: PipelineSection,
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str, path: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Load configuration from `path`.
    ///
    /// A missing file is an error only when it was asked for explicitly; the
    /// default path falls back to built-in defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        if !explicit && !Path::new(path).exists() {
            info!(path, "No configuration file found; using defaults");
            return Ok(Self::default());
        }

        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&yaml, path)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    /// Overlay command-line and environment values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(key) = &cli.gemini_api_key {
            self.gemini.api_key = key.clone();
        }
        if let Some(key) = &cli.clipdrop_api_key {
            self.clipdrop.get_or_insert_with(ClipdropConfig::default).api_key = key.clone();
        }
        if let Some(key) = &cli.freeimage_api_key {
            self.freeimage.get_or_insert_with(FreeimageConfig::default).api_key = key.clone();
        }
        if let Some(url) = &cli.wp_api_url {
            self.wordpress.api_url = url.clone();
        }
        if let Some(user) = &cli.wp_username {
            self.wordpress.username = user.clone();
        }
        if let Some(password) = &cli.wp_app_password {
            self.wordpress.app_password = password.clone();
        }
        if let Some(n) = cli.max_attempts {
            self.pipeline.max_attempts = n;
        }
        if let Some(status) = &cli.status {
            self.pipeline.publish_status = status.clone();
        }
        if let Some(themes) = &cli.themes_file {
            self.pipeline.themes_file = themes.clone();
        }
        debug!(
            max_attempts = self.pipeline.max_attempts,
            status = %self.pipeline.publish_status,
            "Applied command-line overrides"
        );
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.pipeline.publish_status.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "pipeline.publish_status must not be empty".to_string(),
            ));
        }
        if self.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "gemini.api_key is required (or set GOOGLE_GEMINI_API_KEY)".to_string(),
            ));
        }
        if url::Url::parse(&self.wordpress.api_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "wordpress.api_url is not a valid URL: {:?}",
                self.wordpress.api_url
            )));
        }
        Ok(())
    }

    /// Both image services, when both are configured with a key.
    pub fn text_to_image(&self) -> Option<(&ClipdropConfig, &FreeimageConfig)> {
        match (&self.clipdrop, &self.freeimage) {
            (Some(c), Some(f)) if !c.api_key.is_empty() && !f.api_key.is_empty() => Some((c, f)),
            _ => None,
        }
    }
}
