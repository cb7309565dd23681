//! SEO keyword extraction.
//!
//! Keywords are a fixed base list followed by a random sample of longer words
//! from the theme and the article text, deduplicated and capped at
//! [`MAX_KEYWORDS`].

use super::html::visible_text;
use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;

pub const MAX_KEYWORDS: usize = 10;
const SAMPLED_WORDS: usize = 5;
const MIN_WORD_LEN: usize = 5;

const BASE_KEYWORDS: [&str; 8] = [
    "technology",
    "web development",
    "digital transformation",
    "IT solutions",
    "business website",
    "information systems",
    "startup",
    "innovation",
];

const STOPWORDS: [&str; 6] = ["untuk", "dalam", "dengan", "yang", "adalah", "pada"];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap());

/// Build the keyword list for an article about `theme`.
///
/// The base list always comes first and ends with `company`.
pub fn generate_keywords<R: Rng>(
    theme: &str,
    content_html: &str,
    company: &str,
    rng: &mut R,
) -> Vec<String> {
    let theme_words = theme
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    let text = visible_text(content_html).to_lowercase();
    let content_words = WORD.find_iter(&text).map(|m| m.as_str().to_string());

    let candidates = theme_words
        .into_iter()
        .chain(content_words)
        .unique()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN && !STOPWORDS.contains(&w.as_str()))
        .collect::<Vec<_>>();

    BASE_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .chain(std::iter::once(company.to_string()))
        .chain(candidates.choose_multiple(rng, SAMPLED_WORDS).cloned())
        .unique()
        .take(MAX_KEYWORDS)
        .collect()
}
