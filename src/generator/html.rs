//! HTML post-processing of the model's reply.
//!
//! The model is asked for a single `<div class="article-wrapper">`, but often
//! wraps it in prose or a Markdown code fence. These helpers cut the fragment
//! out, put the article image on top, and read the headline back.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static DIV_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<div.*</div>").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

/// Keep only the outermost `<div …>…</div>` span of the reply, if any.
pub fn extract_article_fragment(reply: &str) -> String {
    let trimmed = reply.trim();
    match DIV_SPAN.find(trimmed) {
        Some(m) => m.as_str().to_string(),
        None => trimmed.to_string(),
    }
}

/// Insert a centered image block before the first `<div`.
///
/// Markup without a `<div` is returned unchanged.
pub fn insert_image(html: &str, image_url: &str) -> String {
    let block = format!(
        "<div style=\"text-align:center; margin:20px 0;\"><img src=\"{image_url}\" alt=\"Random image\" \
         loading=\"lazy\" style=\"display:block; margin:0 auto; width:100%; max-width:300px; height:auto; \
         border-radius:10px; object-fit:contain;\" /></div><div"
    );
    html.replacen("<div", &block, 1)
}

/// Text of the first `<h1>`, or a generic title for `company` when there is none.
pub fn extract_title(html: &str, company: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&H1)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| format!("Technology Article by {company}"))
}

/// Re-serialize a fragment through the HTML parser, closing stray tags.
pub fn sanitize_html(html: &str) -> String {
    Html::parse_fragment(html).root_element().inner_html()
}

/// Text content of `html` with markup removed and entities decoded.
pub fn inner_text(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect()
}

/// All text nodes of `html`, space separated.
pub fn visible_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}
