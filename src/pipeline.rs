//! Duplicate-avoiding publish pipeline.
//!
//! The pipeline asks an [`ArticleGenerator`] for a candidate, checks the
//! [`PublishTarget`] for a post with the same title, regenerates on a
//! collision, and publishes the first non-colliding article exactly once.
//!
//! # Attempt cycle
//!
//! ```text
//! Generating -> CheckingExistence -> Publishing -> Published | PublishFailed
//!                      |
//!                      +-> Generating (duplicate, next attempt)
//! ```
//!
//! A generation failure and a publish failure both end the run immediately.
//! Running out of attempts ends it with [`PipelineOutcome::ExhaustedRetries`].
//!
//! # Lookup failures
//!
//! When the existence check itself fails the pipeline publishes anyway
//! (fail-open). During a target outage this can create a duplicate post.

use crate::error::{GenerationError, LookupError};
use crate::models::{Article, PipelineOutcome, PublishResult};
use crate::utils::truncate_for_log;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Produces a fresh candidate article on every call.
pub trait ArticleGenerator {
    async fn generate(&self) -> Result<Article, GenerationError>;
}

/// The system articles are published to.
pub trait PublishTarget {
    /// Whether a post whose title matches `title` (trimmed, case-insensitive)
    /// already exists.
    async fn exists(&self, title: &str) -> Result<bool, LookupError>;

    /// Publish `article` with the given post status. Failures are reported in
    /// the returned [`PublishResult`], never as an error.
    async fn publish(&self, article: &Article, status: &str) -> PublishResult;
}

/// Settings for [`RetryingPublishPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum number of generate/check cycles per run.
    pub max_attempts: u32,
    /// Post status handed to the target, e.g. `publish` or `draft`.
    pub publish_status: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            publish_status: "publish".to_string(),
        }
    }
}

/// Coordinates a generator and a target to publish one unique article.
#[derive(Debug)]
pub struct RetryingPublishPipeline<G, T> {
    generator: G,
    target: T,
    config: PipelineConfig,
}

impl<G, T> RetryingPublishPipeline<G, T>
where
    G: ArticleGenerator,
    T: PublishTarget,
{
    pub fn new(generator: G, target: T, config: PipelineConfig) -> Self {
        Self {
            generator,
            target,
            config,
        }
    }

    /// Run one pipeline invocation.
    ///
    /// `cancel` is checked before each attempt; nothing is retained between
    /// attempts so cancelling there is always safe.
    #[instrument(level = "info", skip_all, fields(max_attempts = self.config.max_attempts))]
    pub async fn run(&self, cancel: &CancellationToken) -> PipelineOutcome {
        let max_attempts = self.config.max_attempts;
        let mut last_title = String::new();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                warn!(attempt, "Pipeline cancelled before attempt");
                return PipelineOutcome::Cancelled {
                    attempts: attempt - 1,
                };
            }

            let article = match self.generator.generate().await {
                Ok(article) if article.has_title() => article,
                Ok(_) => {
                    let reason = GenerationError::EmptyTitle.to_string();
                    error!(attempt, %reason, "Generated article is not publishable");
                    return PipelineOutcome::GenerationFailed { attempt, reason };
                }
                Err(e) => {
                    error!(attempt, error = %e, "Article generation failed");
                    return PipelineOutcome::GenerationFailed {
                        attempt,
                        reason: e.to_string(),
                    };
                }
            };

            match self.target.exists(&article.title).await {
                Ok(true) => {
                    warn!(
                        attempt,
                        max = max_attempts,
                        title = %article.title,
                        "Duplicate title detected; regenerating"
                    );
                    last_title = article.title;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // fail-open: publish when the check is indeterminate
                    warn!(
                        attempt,
                        title = %article.title,
                        error = %e,
                        "Duplicate check failed; treating title as unused"
                    );
                }
            }

            return self.publish(attempt, &article).await;
        }

        error!(
            attempts = max_attempts,
            %last_title,
            "Unable to generate a unique title; aborting"
        );
        PipelineOutcome::ExhaustedRetries {
            attempts: max_attempts,
            last_title,
        }
    }

    async fn publish(&self, attempt: u32, article: &Article) -> PipelineOutcome {
        let result = self
            .target
            .publish(article, &self.config.publish_status)
            .await;
        debug!(attempt, success = result.is_success(), "Publish call returned");

        match result {
            PublishResult::Success(post) => {
                info!(
                    attempt,
                    id = post.id,
                    link = %post.link,
                    title = %post.published_title,
                    "Post published"
                );
                PipelineOutcome::Published(post)
            }
            PublishResult::Failure {
                error_code,
                error_message,
            } => {
                error!(
                    attempt,
                    title = %article.title,
                    %error_code,
                    error_message = %truncate_for_log(&error_message, 300),
                    "Failed to publish post"
                );
                PipelineOutcome::PublishFailed {
                    title: article.title.clone(),
                    error_code,
                    error_message,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublishedPost;
    use crate::utils::normalize_title;
    use chrono::Local;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            content: format!("<div><h1>{title}</h1></div>"),
            keywords: vec!["technology".to_string()],
            image_reference: None,
            theme: "Testing".to_string(),
            generated_at: Local::now(),
        }
    }

    /// Hands out queued results in order, then a fixed title forever.
    struct ScriptedGenerator {
        queue: Mutex<VecDeque<Result<Article, GenerationError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGenerator {
        fn titles(titles: &[&str]) -> Self {
            Self::results(titles.iter().map(|t| Ok(article(t))).collect())
        }

        fn results(results: Vec<Result<Article, GenerationError>>) -> Self {
            Self {
                queue: Mutex::new(results.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ArticleGenerator for &ScriptedGenerator {
        async fn generate(&self) -> Result<Article, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(article("Fallback Title")))
        }
    }

    struct FakeTarget {
        existing: HashSet<String>,
        lookup_fails: bool,
        publish_result: Option<PublishResult>,
        /// Cancelled from inside `exists`, as an interrupt arriving mid-attempt.
        cancel_on_lookup: Option<CancellationToken>,
        exists_calls: AtomicU32,
        published: Mutex<Vec<(String, String)>>,
    }

    impl FakeTarget {
        fn with_existing(titles: &[&str]) -> Self {
            Self {
                existing: titles.iter().map(|t| normalize_title(t)).collect(),
                lookup_fails: false,
                publish_result: None,
                cancel_on_lookup: None,
                exists_calls: AtomicU32::new(0),
                published: Mutex::new(Vec::new()),
            }
        }

        fn exists_calls(&self) -> u32 {
            self.exists_calls.load(Ordering::SeqCst)
        }

        fn published(&self) -> Vec<(String, String)> {
            self.published.lock().unwrap().clone()
        }
    }

    impl PublishTarget for &FakeTarget {
        async fn exists(&self, title: &str) -> Result<bool, LookupError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_lookup {
                token.cancel();
            }
            if self.lookup_fails {
                return Err(LookupError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.existing.contains(&normalize_title(title)))
        }

        async fn publish(&self, article: &Article, status: &str) -> PublishResult {
            self.published
                .lock()
                .unwrap()
                .push((article.title.clone(), status.to_string()));
            self.publish_result.clone().unwrap_or_else(|| {
                PublishResult::Success(PublishedPost {
                    id: 42,
                    link: "https://blog.example.com/?p=42".to_string(),
                    published_title: article.title.clone(),
                })
            })
        }
    }

    fn config(max_attempts: u32) -> PipelineConfig {
        PipelineConfig {
            max_attempts,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.publish_status, "publish");
    }

    #[tokio::test]
    async fn test_regenerates_until_unique_title() {
        let generator = ScriptedGenerator::titles(&["T1", "T2", "T3"]);
        let target = FakeTarget::with_existing(&["T1", "T2"]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(3));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        match outcome {
            PipelineOutcome::Published(post) => assert_eq!(post.published_title, "T3"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(generator.calls(), 3);
        assert_eq!(target.exists_calls(), 3);
        assert_eq!(
            target.published(),
            vec![("T3".to_string(), "publish".to_string())]
        );
    }

    #[tokio::test]
    async fn test_exhausts_retries_without_publishing() {
        let generator = ScriptedGenerator::titles(&["Same", "Again"]);
        let target = FakeTarget::with_existing(&["same", "again"]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(2));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::ExhaustedRetries {
                attempts: 2,
                last_title: "Again".to_string(),
            }
        );
        assert!(target.published().is_empty());
    }

    #[tokio::test]
    async fn test_never_generates_past_max_attempts() {
        let generator = ScriptedGenerator::titles(&[]);
        let target = FakeTarget::with_existing(&["Fallback Title"]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(10));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::ExhaustedRetries { attempts: 10, .. }
        ));
        assert_eq!(generator.calls(), 10);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_run() {
        let generator = ScriptedGenerator::results(vec![Err(GenerationError::Upstream(
            "503 from model".to_string(),
        ))]);
        let target = FakeTarget::with_existing(&[]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        match outcome {
            PipelineOutcome::GenerationFailed { attempt, reason } => {
                assert_eq!(attempt, 1);
                assert!(reason.contains("503 from model"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(generator.calls(), 1);
        assert_eq!(target.exists_calls(), 0);
        assert!(target.published().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_after_duplicate() {
        let generator = ScriptedGenerator::results(vec![
            Ok(article("Taken")),
            Err(GenerationError::Upstream("timeout".to_string())),
        ]);
        let target = FakeTarget::with_existing(&["Taken"]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::GenerationFailed { attempt: 2, .. }
        ));
        assert_eq!(target.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_title_is_generation_failure_not_duplicate() {
        let generator = ScriptedGenerator::titles(&["  "]);
        let target = FakeTarget::with_existing(&[]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::GenerationFailed { attempt: 1, .. }
        ));
        assert_eq!(generator.calls(), 1);
        assert_eq!(target.exists_calls(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_is_terminal() {
        let generator = ScriptedGenerator::titles(&["T1", "T2"]);
        let mut target = FakeTarget::with_existing(&[]);
        target.publish_result = Some(PublishResult::Failure {
            error_code: "SERVER_ERROR".to_string(),
            error_message: "internal error".to_string(),
        });
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert_eq!(
            outcome,
            PipelineOutcome::PublishFailed {
                title: "T1".to_string(),
                error_code: "SERVER_ERROR".to_string(),
                error_message: "internal error".to_string(),
            }
        );
        assert_eq!(generator.calls(), 1);
        assert_eq!(target.published().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_open() {
        let generator = ScriptedGenerator::titles(&["T1"]);
        let mut target = FakeTarget::with_existing(&[]);
        target.lookup_fails = true;
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&CancellationToken::new()).await;

        assert!(matches!(outcome, PipelineOutcome::Published(_)));
        assert_eq!(generator.calls(), 1);
        assert_eq!(target.published().len(), 1);
    }

    #[tokio::test]
    async fn test_passes_configured_status() {
        let generator = ScriptedGenerator::titles(&["Draft Me"]);
        let target = FakeTarget::with_existing(&[]);
        let pipeline = RetryingPublishPipeline::new(
            &generator,
            &target,
            PipelineConfig {
                max_attempts: 1,
                publish_status: "draft".to_string(),
            },
        );

        pipeline.run(&CancellationToken::new()).await;

        assert_eq!(
            target.published(),
            vec![("Draft Me".to_string(), "draft".to_string())]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let generator = ScriptedGenerator::titles(&["T1"]);
        let target = FakeTarget::with_existing(&[]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = pipeline.run(&cancel).await;

        assert_eq!(outcome, PipelineOutcome::Cancelled { attempts: 0 });
        assert_eq!(generator.calls(), 0);
        assert_eq!(target.exists_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_during_attempt_stops_before_next() {
        let generator = ScriptedGenerator::titles(&["Taken", "Fresh"]);
        let cancel = CancellationToken::new();
        let mut target = FakeTarget::with_existing(&["Taken"]);
        target.cancel_on_lookup = Some(cancel.clone());
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(5));

        let outcome = pipeline.run(&cancel).await;

        assert_eq!(outcome, PipelineOutcome::Cancelled { attempts: 1 });
        assert_eq!(generator.calls(), 1);
        assert_eq!(target.exists_calls(), 1);
        assert!(target.published().is_empty());
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let generator = ScriptedGenerator::titles(&["Dup", "Fresh", "Dup", "Other"]);
        let target = FakeTarget::with_existing(&["Dup"]);
        let pipeline = RetryingPublishPipeline::new(&generator, &target, config(2));
        let cancel = CancellationToken::new();

        let first = pipeline.run(&cancel).await;
        let second = pipeline.run(&cancel).await;

        assert!(matches!(first, PipelineOutcome::Published(ref p) if p.published_title == "Fresh"));
        assert!(matches!(second, PipelineOutcome::Published(ref p) if p.published_title == "Other"));
        assert_eq!(generator.calls(), 4);
    }
}
