//! Article generation backed by Gemini.
//!
//! [`GeminiArticleGenerator`] turns a random theme into a finished
//! [`Article`]:
//!
//! 1. **Prompt**: pick a theme and quote ([`prompt`])
//! 2. **Ask**: send the prompt to the model, with transport retries ([`crate::api`])
//! 3. **Image**: generate or pick an image URL ([`crate::image`])
//! 4. **Post-process**: cut the HTML fragment, insert the image, read the
//!    title, normalize the markup ([`html`])
//! 5. **Keywords**: derive SEO keywords ([`keywords`])

pub mod html;
pub mod keywords;
pub mod prompt;

use crate::api::AskAsync;
use crate::config::SiteConfig;
use crate::error::GenerationError;
use crate::image::ImageSource;
use crate::models::Article;
use crate::pipeline::ArticleGenerator;
use chrono::Local;
use prompt::PromptSeed;
use tracing::{debug, info, instrument};

pub struct GeminiArticleGenerator<A> {
    ask: A,
    images: ImageSource,
    themes: Vec<String>,
    site: SiteConfig,
}

impl<A> GeminiArticleGenerator<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(ask: A, images: ImageSource, themes: Vec<String>, site: SiteConfig) -> Self {
        Self {
            ask,
            images,
            themes,
            site,
        }
    }
}

impl<A> ArticleGenerator for GeminiArticleGenerator<A>
where
    A: AskAsync<Response = String>,
{
    #[instrument(level = "info", skip_all)]
    async fn generate(&self) -> Result<Article, GenerationError> {
        let generated_at = Local::now();
        let timestamp = generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let seed = PromptSeed::pick(&self.themes, timestamp, &mut rand::rng())
            .ok_or_else(|| GenerationError::Upstream("no themes configured".to_string()))?;
        let prompt = prompt::build_prompt(&self.site, &seed);
        debug!(theme = %seed.theme, id = %seed.id, "Built prompt");

        let reply = self
            .ask
            .ask(&prompt)
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let image_url = self.images.resolve(&seed.theme).await;

        let fragment = html::extract_article_fragment(&reply);
        let with_image = html::insert_image(&fragment, &image_url);
        let title = html::extract_title(&with_image, &self.site.company_name);
        let content = html::sanitize_html(&with_image);
        let keywords = keywords::generate_keywords(
            &seed.theme,
            &content,
            &self.site.company_name,
            &mut rand::rng(),
        );

        info!(%title, theme = %seed.theme, keywords = keywords.len(), "Generated article");
        Ok(Article {
            title,
            content,
            keywords,
            image_reference: Some(image_url),
            theme: seed.theme,
            generated_at,
        })
    }
}
