// ABOUTME: Hacker News source: walks top stories, keeps self posts (or all stories), and builds Articles.
// ABOUTME: Self-post text is sanitized into an hn-text block; link posts are extracted with timeout-aware markers.

use std::time::Duration;

use chrono::DateTime;
use morning_extract::formats::sanitize_html;
use morning_extract::Extractor;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, HackerNewsConfig};
use crate::error::FeedError;
use crate::fetchers::{get_bytes, pause};
use crate::models::Article;

pub const SOURCE_NAME: &str = "Hacker News";
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(2);
/// Hard cap on stories per run, whatever the configuration asks for.
pub const MAX_STORIES: usize = 10;

const SELF_POST_PREFIXES: &[&str] = &["Show HN:", "Ask HN:", "Tell HN:"];
const NO_TEXT: &str = "<p><em>No text content available</em></p>";

/// The fields of an item we read; everything is optional in the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HnItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub descendants: Option<i64>,
    #[serde(default)]
    pub time: Option<i64>,
}

impl HnItem {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default().trim()
    }

    /// Text hosted on Hacker News itself rather than a link elsewhere.
    pub fn is_self_post(&self) -> bool {
        let title = self.title();
        SELF_POST_PREFIXES.iter().any(|p| title.starts_with(p))
            || match &self.url {
                None => true,
                Some(url) => url.starts_with("item?id="),
            }
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct HackerNewsFetcher {
    config: HackerNewsConfig,
    extractor: Extractor,
    extract_full_content: bool,
    pause: Duration,
}

impl HackerNewsFetcher {
    pub fn new(config: &AppConfig, extractor: Extractor) -> Self {
        Self {
            config: config.hacker_news.clone(),
            extractor,
            extract_full_content: config.extract_full_content,
            pause: DEFAULT_PAUSE,
        }
    }

    /// Pause after each accepted story.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Stories from the top list; empty when disabled or when the list cannot be read.
    #[instrument(skip_all)]
    pub async fn fetch_articles(&self) -> Vec<Article> {
        if !self.config.include {
            debug!("hacker news disabled");
            return Vec::new();
        }

        let ids = match self.top_story_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "could not read top stories");
                return Vec::new();
            }
        };
        info!(count = ids.len(), "retrieved top stories");

        let limit = self.config.max_articles.min(MAX_STORIES);
        let mut articles = Vec::new();
        for id in ids {
            if articles.len() >= limit {
                break;
            }

            let item = match self.item(id).await {
                Ok(item) => item,
                Err(e) => {
                    warn!(id, error = %e, "skipping story");
                    continue;
                }
            };
            if self.config.only_self_posts && !item.is_self_post() {
                debug!(id, "skipping story, not a self post");
                continue;
            }

            articles.push(self.build_article(&item).await);
            pause(self.pause).await;
        }

        info!(count = articles.len(), "fetched hacker news stories");
        articles
    }

    async fn top_story_ids(&self) -> Result<Vec<u64>, FeedError> {
        let url = &self.config.api_endpoints.top_stories;
        let body = get_bytes(self.extractor.http_client(), url, self.request_timeout()).await?;
        let ids: Vec<u64> = serde_json::from_slice(&body)
            .map_err(|e| FeedError::invalid(format!("top stories: {}", e)))?;
        if ids.is_empty() {
            return Err(FeedError::Empty);
        }
        Ok(ids)
    }

    async fn item(&self, id: u64) -> Result<HnItem, FeedError> {
        let url = self.config.api_endpoints.item_url(id);
        let body = get_bytes(self.extractor.http_client(), &url, self.request_timeout()).await?;
        // Deleted items come back as JSON null.
        let item: Option<HnItem> = serde_json::from_slice(&body)
            .map_err(|e| FeedError::invalid(format!("item {}: {}", id, e)))?;
        item.ok_or_else(|| FeedError::invalid(format!("item {}: no data", id)))
    }

    async fn build_article(&self, item: &HnItem) -> Article {
        let link = item
            .url
            .clone()
            .unwrap_or_else(|| self.config.api_endpoints.discussion(item.id));
        let summary = format!(
            "Points: {} | Comments: {}",
            item.score.unwrap_or(0),
            item.descendants.unwrap_or(0)
        );
        let published = DateTime::from_timestamp(item.time.unwrap_or(0), 0)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let mut article = Article {
            title: item.title().to_string(),
            source: SOURCE_NAME.to_string(),
            link,
            published,
            summary,
            content: String::new(),
        };

        article.content = match item.text() {
            Some(text) => format!("<div class='hn-text'>{}</div>", sanitize_html(text)),
            None if self.extract_full_content => self.extract(&article).await,
            None => NO_TEXT.to_string(),
        };
        article
    }

    async fn extract(&self, article: &Article) -> String {
        match self.extractor.fetch_and_extract(&article.link).await {
            Ok(content) => content,
            Err(e) if e.is_timeout() => {
                warn!(title = %article.title, "content extraction timed out");
                format!(
                    "{}<p><em>Content extraction timed out</em></p>",
                    article.summary_fragment()
                )
            }
            Err(e) => {
                warn!(title = %article.title, error = %e, "content extraction failed");
                format!(
                    "{}<p><em>Content extraction failed</em></p>",
                    article.summary_fragment()
                )
            }
        }
    }

    fn request_timeout(&self) -> Duration {
        self.extractor.config().request_timeout
    }
}
