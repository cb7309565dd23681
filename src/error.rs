//! Error types shared by the pipeline and its collaborators.
//!
//! Each collaborator boundary has its own error type so the pipeline can
//! apply a different policy to each one:
//! - [`GenerationError`]: aborts the run
//! - [`LookupError`]: logged, then treated as "not a duplicate"
//! - [`ImageError`]: logged inside the generator, never surfaced
//! - [`ConfigError`]: fatal at startup

use thiserror::Error;

/// Failure to produce a publishable article.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The language model API failed or returned nothing usable.
    #[error("upstream content service failed: {0}")]
    Upstream(String),

    /// The generated article has no title.
    #[error("generated article has an empty title")]
    EmptyTitle,
}

/// Failure of the duplicate-title lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("lookup response could not be decoded: {0}")]
    Decode(String),
}

/// Failure while synthesizing or uploading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API Error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("image upload failed: {0}")]
    Upload(String),
}

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
