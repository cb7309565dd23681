//! Prompt construction for article generation.

use crate::config::SiteConfig;
use crate::error::ConfigError;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, instrument};

const QUOTES: [&str; 4] = [
    "\"A website is not just a display it's your company's digital trust representation.\"",
    "\"Digital transformation is not an option, it's a necessity to stay relevant.\"",
    "\"Efficient systems are born from collaboration between strategy and technology.\"",
    "\"Technology helps businesses grow faster and smarter.\"",
];

/// Read article themes, one per line. Blank lines are ignored.
///
/// # Errors
///
/// Fails when the file cannot be read or holds no themes.
#[instrument(level = "info")]
pub fn load_themes(path: &str) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    let themes = parse_themes(&text);
    if themes.is_empty() {
        return Err(ConfigError::Invalid(format!("no themes found in {path}")));
    }
    info!(count = themes.len(), "Loaded themes");
    Ok(themes)
}

fn parse_themes(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// The random choices behind one prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSeed {
    pub theme: String,
    pub quote: String,
    pub timestamp: String,
    /// Eight hex characters; keeps otherwise identical prompts distinct.
    pub id: String,
}

impl PromptSeed {
    /// Pick a theme and a quote at random. `themes` must not be empty.
    pub fn pick<R: Rng>(themes: &[String], timestamp: String, rng: &mut R) -> Option<Self> {
        let theme = themes.choose(rng)?.clone();
        let quote = QUOTES.choose(rng)?.to_string();
        let id = format!("{:08x}", rng.random::<u32>());
        Some(Self {
            theme,
            quote,
            timestamp,
            id,
        })
    }
}

/// Render the article prompt for `site`.
pub fn build_prompt(site: &SiteConfig, seed: &PromptSeed) -> String {
    let SiteConfig {
        company_name: name,
        company_url: url,
        company_description: description,
    } = site;

    format!(
        r#"Write a complete blog article in **English only** for a professional IT service company called **{name}** ({url}).

Company background:
- {name} is {description}.

Article theme: {theme}
Relevant quote to include: {quote}
Generated at: {timestamp}, ID: {id}

=== Structure ===
Return the article wrapped inside a single <div class="article-wrapper"> ... </div>,
without <html>, <head>, or <body> tags.

Inside the <div> must include:
- <h1>: article title
- a short introduction paragraph (<p>)
- Table of Contents generated from <h2> headings
- main sections using <h2> and <h3>
- a FAQ section with at least 3 Q&A related to the topic
- a natural call-to-action paragraph at the end, inviting readers to contact {name}

Style:
- Professional, modern, and informative
- Written as if it's from a real IT service company
- Avoid overly promotional tone, focus on providing value and insights

Example CTA:
"If your business needs an efficient website or digital system, contact the {name} team today."
"#,
        theme = seed.theme,
        quote = seed.quote,
        timestamp = seed.timestamp,
        id = seed.id,
    )
}
