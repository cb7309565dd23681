//! WordPress REST API publish target.
//!
//! Talks to the `wp/v2/posts` collection using an application password.
//!
//! # Duplicate check
//!
//! [`WordPressTarget::exists`] runs a `search` query for the title in the
//! `edit` context, across every post status, and compares the stored (`raw`)
//! titles after trimming and lowercasing. `rendered` has gone through
//! WordPress' typographic filters (curly quotes, dashes, ellipses), so it is
//! only used, markup stripped, when `raw` is missing. The search is only a
//! prefilter; the comparison decides.
//!
//! # Publishing
//!
//! [`WordPressTarget::publish`] never fails with an error. HTTP, transport
//! and decoding problems all become [`PublishResult::Failure`].

use crate::config::WordPressConfig;
use crate::error::LookupError;
use crate::generator::html::inner_text;
use crate::models::{Article, PublishResult, PublishedPost};
use crate::pipeline::PublishTarget;
use crate::utils::{normalize_title, slugify_title, truncate_for_log};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const SEARCH_PAGE_SIZE: &str = "100";
/// Every status a post with the same title may already sit in.
const SEARCH_STATUSES: &str = "publish,future,draft,pending,private";

#[derive(Debug, Deserialize)]
struct Title {
    /// Only present in the `edit` context.
    raw: Option<String>,
    #[serde(default)]
    rendered: String,
}

impl Title {
    /// The title as stored, falling back to the rendered one without markup.
    fn stored(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => inner_text(&self.rendered),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WpPost {
    id: u64,
    #[serde(default)]
    link: String,
    title: Title,
}

#[derive(Debug, Serialize)]
struct CreatePost<'a> {
    title: &'a str,
    content: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    categories: &'a [u64],
    tags: &'a [u64],
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Map<String, Value>>,
}

pub struct WordPressTarget {
    http: reqwest::Client,
    config: WordPressConfig,
}

impl fmt::Debug for WordPressTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressTarget")
            .field("api_url", &self.config.api_url)
            .field("username", &self.config.username)
            .finish_non_exhaustive()
    }
}

impl WordPressTarget {
    pub fn new(config: WordPressConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.username, self.config.app_password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn request_body<'a>(&'a self, article: &'a Article, status: &'a str) -> CreatePost<'a> {
        let slug = Some(slugify_title(&article.title)).filter(|s| !s.is_empty());
        let meta = article
            .keywords
            .iter()
            .find(|k| !k.trim().is_empty())
            .map(|focus| {
                let mut meta = Map::new();
                meta.insert(
                    self.config.seo_focus_keyword_field.clone(),
                    Value::String(focus.clone()),
                );
                meta
            });

        CreatePost {
            title: &article.title,
            content: &article.content,
            status,
            slug,
            categories: &self.config.categories,
            tags: &self.config.tags,
            meta,
        }
    }
}

impl PublishTarget for WordPressTarget {
    #[instrument(level = "info", skip(self))]
    async fn exists(&self, title: &str) -> Result<bool, LookupError> {
        let wanted = normalize_title(title);
        let response = self
            .http
            .get(&self.config.api_url)
            .header("Authorization", self.authorization())
            .query(&[
                ("search", title.trim()),
                ("per_page", SEARCH_PAGE_SIZE),
                ("context", "edit"),
                ("status", SEARCH_STATUSES),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let posts: Vec<WpPost> =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        let duplicate = posts
            .iter()
            .find(|post| normalize_title(&post.title.stored()) == wanted);

        match duplicate {
            Some(post) => {
                debug!(id = post.id, link = %post.link, "Found post with the same title");
                Ok(true)
            }
            None => {
                debug!(candidates = posts.len(), "No post with the same title");
                Ok(false)
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(title = %article.title, %status))]
    async fn publish(&self, article: &Article, status: &str) -> PublishResult {
        let body = self.request_body(article, status);
        let sent = self
            .http
            .post(&self.config.api_url)
            .header("Authorization", self.authorization())
            .json(&body)
            .send()
            .await;

        let response = match sent {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Publish request failed");
                return PublishResult::Failure {
                    error_code: "TRANSPORT_ERROR".to_string(),
                    error_message: e.to_string(),
                };
            }
        };

        let code = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return PublishResult::Failure {
                    error_code: code.as_u16().to_string(),
                    error_message: e.to_string(),
                };
            }
        };

        if !code.is_success() {
            return PublishResult::Failure {
                error_code: code.as_u16().to_string(),
                error_message: text,
            };
        }

        match serde_json::from_str::<WpPost>(&text) {
            Ok(post) => {
                info!(id = post.id, link = %post.link, "WordPress accepted post");
                PublishResult::Success(PublishedPost {
                    id: post.id,
                    link: post.link,
                    published_title: post.title.stored(),
                })
            }
            Err(e) => PublishResult::Failure {
                error_code: code.as_u16().to_string(),
                error_message: format!("Invalid JSON response: {e}"),
            },
        }
    }
}
