//! Command-line interface definitions for autopost.
//!
//! Every option can also be given through an environment variable, which is
//! how credentials are normally supplied from cron.

use clap::Parser;

/// Command-line arguments for autopost.
///
/// Values given here override the configuration file.
///
/// # Examples
///
/// ```sh
/// # Use config.yaml in the working directory
/// autopost
///
/// # Publish as draft, at most three titles
/// autopost --status draft --max-attempts 3
///
/// # Write a JSON report of the run
/// autopost --config /etc/autopost.yaml --report-dir ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file (defaults to ./config.yaml when present)
    #[arg(short, long, env = "AUTOPOST_CONFIG")]
    pub config: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Clipdrop API key (enables AI-generated images together with --freeimage-api-key)
    #[arg(long, env = "CLIPDROP_API_KEY", hide_env_values = true)]
    pub clipdrop_api_key: Option<String>,

    /// freeimage.host API key
    #[arg(long, env = "FREEIMAGE_API_KEY", hide_env_values = true)]
    pub freeimage_api_key: Option<String>,

    /// WordPress posts endpoint, e.g. https://example.com/wp-json/wp/v2/posts
    #[arg(long, env = "WP_API_URL")]
    pub wp_api_url: Option<String>,

    /// WordPress user name
    #[arg(long, env = "WP_USERNAME")]
    pub wp_username: Option<String>,

    /// WordPress application password
    #[arg(long, env = "WP_APP_PASSWORD", hide_env_values = true)]
    pub wp_app_password: Option<String>,

    /// Maximum number of titles to try before giving up
    #[arg(short = 'n', long)]
    pub max_attempts: Option<u32>,

    /// Post status for the published article (publish, draft, pending, ...)
    #[arg(short, long)]
    pub status: Option<String>,

    /// File with one article theme per line
    #[arg(short, long)]
    pub themes_file: Option<String>,

    /// Directory to write a JSON report of the run into
    #[arg(short, long)]
    pub report_dir: Option<String>,
}
