//! # autopost
//!
//! Generates a blog article with Gemini, attaches an image, and publishes it
//! to WordPress, regenerating whenever the title is already taken.
//!
//! ## Usage
//!
//! ```sh
//! autopost --config ./config.yaml --report-dir ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: YAML file overlaid with CLI flags and environment variables
//! 2. **Generation**: prompt Gemini, post-process the HTML, pick an image and keywords
//! 3. **Duplicate check**: search WordPress for a post with the same title
//! 4. **Publish**: create the post once a title is unused
//!
//! Steps 2 and 3 repeat up to `max_attempts` times. The process exit code
//! reflects the outcome (see [`models::PipelineOutcome::exit_code`]).

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod generator;
mod image;
mod models;
mod outputs;
mod pipeline;
mod utils;
mod wordpress;

use api::{GeminiClient, RetryAsk};
use cli::Cli;
use config::AppConfig;
use generator::GeminiArticleGenerator;
use image::ImageSource;
use models::{PipelineOutcome, RunReport};
use outputs::json;
use pipeline::RetryingPublishPipeline;
use utils::ensure_writable_dir;
use wordpress::WordPressTarget;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match run().await {
        Ok(outcome) => ExitCode::from(outcome.exit_code() as u8),
        Err(e) => {
            error!(error = %e, "autopost failed");
            ExitCode::FAILURE
        }
    }
}

#[instrument]
async fn run() -> Result<PipelineOutcome, Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("autopost starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.report_dir, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli(&args);
    config.validate()?;

    // Early check: fail before spending an LLM call when the report can't be written
    if let Some(dir) = &args.report_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Report directory is not writable");
            return Err(e);
        }
    }

    // ---- Collaborators ----
    let themes = generator::prompt::load_themes(&config.pipeline.themes_file)?;
    let gemini = GeminiClient::new(&config.gemini)?;
    let ask = RetryAsk::new(gemini, config.gemini.max_retries, Duration::from_secs(1));
    let images = ImageSource::from_config(&config)?;
    info!(
        text_to_image = config.text_to_image().is_some(),
        themes = themes.len(),
        "Collaborators ready"
    );
    let generator = GeminiArticleGenerator::new(ask, images, themes, config.site.clone());
    let target = WordPressTarget::new(config.wordpress.clone())?;
    let pipeline =
        RetryingPublishPipeline::new(generator, target, config.pipeline.pipeline_config());

    // ---- Cancellation on Ctrl-C ----
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current attempt");
            signal_token.cancel();
        }
    });

    // ---- Run ----
    let started_at = Local::now();
    let outcome = pipeline.run(&cancel).await;
    let finished_at = Local::now();

    match &outcome {
        PipelineOutcome::Published(post) => {
            info!(id = post.id, link = %post.link, title = %post.published_title, "Post published successfully")
        }
        PipelineOutcome::ExhaustedRetries {
            attempts,
            last_title,
        } => warn!(attempts, %last_title, "No unique title found"),
        PipelineOutcome::GenerationFailed { attempt, reason } => {
            error!(attempt, %reason, "Article generation failed")
        }
        PipelineOutcome::PublishFailed {
            title,
            error_code,
            error_message,
        } => error!(%title, %error_code, %error_message, "Failed to publish post"),
        PipelineOutcome::Cancelled { attempts } => warn!(attempts, "Run cancelled"),
    }

    // ---- Report ----
    if let Some(dir) = &args.report_dir {
        let report = RunReport {
            started_at,
            finished_at,
            outcome: outcome.clone(),
        };
        if let Err(e) = json::write_report(&report, dir).await {
            error!(error = %e, "Failed to write run report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(outcome)
}
