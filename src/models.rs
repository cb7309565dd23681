//! Data models passed between the generator, the publish target and the pipeline.
//!
//! - [`Article`]: a generated candidate post
//! - [`PublishResult`]: what the publish target reports back
//! - [`PipelineOutcome`]: the single result of one pipeline run
//! - [`RunReport`]: the JSON document written after a run

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A generated blog article, not yet published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// The headline; used as the uniqueness key on the target.
    pub title: String,
    /// The HTML body.
    pub content: String,
    /// SEO keywords, most relevant first.
    pub keywords: Vec<String>,
    /// URL of an image embedded in the article, if one was available.
    pub image_reference: Option<String>,
    /// The theme the article was written about.
    pub theme: String,
    pub generated_at: DateTime<Local>,
}

impl Article {
    /// An article is publishable only with a non-blank title.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A post as stored by the target after a successful publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: u64,
    pub link: String,
    /// The title as the target stored it (possibly canonicalized).
    pub published_title: String,
}

/// Result of a single publish call.
///
/// Exactly one of the success or failure shapes exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishResult {
    Success(PublishedPost),
    Failure {
        error_code: String,
        error_message: String,
    },
}

impl PublishResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishResult::Success(_))
    }
}

/// The outcome of one [`RetryingPublishPipeline`](crate::pipeline::RetryingPublishPipeline) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// A post with a previously unused title was published.
    Published(PublishedPost),
    /// Every attempt produced a title that already exists on the target.
    ExhaustedRetries { attempts: u32, last_title: String },
    /// The generator failed; the run stopped at `attempt`.
    GenerationFailed { attempt: u32, reason: String },
    /// The target rejected the post.
    PublishFailed {
        title: String,
        error_code: String,
        error_message: String,
    },
    /// The caller cancelled the run after `attempts` completed attempts.
    Cancelled { attempts: u32 },
}

impl PipelineOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineOutcome::Published(_) => 0,
            PipelineOutcome::ExhaustedRetries { .. } => 2,
            PipelineOutcome::GenerationFailed { .. } => 3,
            PipelineOutcome::PublishFailed { .. } => 4,
            PipelineOutcome::Cancelled { .. } => 130,
        }
    }
}

/// Summary of one invocation, serialized to the report directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub outcome: PipelineOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            content: "<div><h1>T</h1></div>".to_string(),
            keywords: vec![],
            image_reference: None,
            theme: "Cloud migration".to_string(),
            generated_at: Local::now(),
        }
    }

    #[test]
    fn test_has_title() {
        assert!(article("Hello").has_title());
        assert!(!article("").has_title());
        assert!(!article("   \n").has_title());
    }

    #[test]
    fn test_publish_result_is_success() {
        let ok = PublishResult::Success(PublishedPost {
            id: 7,
            link: "https://example.com/?p=7".to_string(),
            published_title: "Hello".to_string(),
        });
        let err = PublishResult::Failure {
            error_code: "500".to_string(),
            error_message: "boom".to_string(),
        };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = PipelineOutcome::ExhaustedRetries {
            attempts: 10,
            last_title: "Same Again".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "exhausted_retries");
        assert_eq!(json["attempts"], 10);
        assert_eq!(json["last_title"], "Same Again");
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            PipelineOutcome::Published(PublishedPost {
                id: 1,
                link: String::new(),
                published_title: String::new(),
            })
            .exit_code(),
            PipelineOutcome::ExhaustedRetries {
                attempts: 1,
                last_title: String::new(),
            }
            .exit_code(),
            PipelineOutcome::GenerationFailed {
                attempt: 1,
                reason: String::new(),
            }
            .exit_code(),
            PipelineOutcome::PublishFailed {
                title: String::new(),
                error_code: String::new(),
                error_message: String::new(),
            }
            .exit_code(),
            PipelineOutcome::Cancelled { attempts: 0 }.exit_code(),
        ];
        assert_eq!(codes, [0, 2, 3, 4, 130]);
    }
}
