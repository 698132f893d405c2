// ABOUTME: RSS/Atom source: fetches each configured feed, builds Articles and optionally extracts full bodies.
// ABOUTME: Extraction errors fall back to the wrapped summary; a failing feed is logged and skipped.

use std::time::Duration;

use morning_extract::{is_valid_url, Extractor};
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, FeedConfig};
use crate::error::FeedError;
use crate::fetchers::{get_bytes, pause};
use crate::models::{Article, FeedEntry};
use crate::parser::parse_feed_bytes;

pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RssFetcher {
    feeds: Vec<FeedConfig>,
    extractor: Extractor,
    extract_full_content: bool,
    pause: Duration,
}

impl RssFetcher {
    pub fn new(config: &AppConfig, extractor: Extractor) -> Self {
        Self {
            feeds: config.rss_feeds.clone(),
            extractor,
            extract_full_content: config.extract_full_content,
            pause: DEFAULT_PAUSE,
        }
    }

    /// Pause after each extraction attempt, failed ones included.
    /// Nothing pauses when full-content extraction is off.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Articles from every configured feed, in feed order then entry order.
    pub async fn fetch_articles(&self) -> Vec<Article> {
        let mut articles = Vec::new();
        for feed in &self.feeds {
            match self.fetch_feed(feed).await {
                Ok(mut batch) => {
                    info!(feed = %feed.name, count = batch.len(), "fetched feed");
                    articles.append(&mut batch);
                }
                Err(e) => warn!(feed = %feed.name, error = %e, "skipping feed"),
            }
        }
        articles
    }

    #[instrument(skip_all, fields(feed = %feed.name, url = %feed.url))]
    async fn fetch_feed(&self, feed: &FeedConfig) -> Result<Vec<Article>, FeedError> {
        let timeout = self.extractor.config().request_timeout;
        let body = get_bytes(self.extractor.http_client(), &feed.url, timeout).await?;
        let entries = parse_feed_bytes(&body)?;

        let mut articles = Vec::new();
        for entry in entries.into_iter().take(feed.max_articles) {
            let Some(article) = article_from_entry(entry, &feed.name) else {
                continue;
            };
            articles.push(self.fill_content(article).await);
        }
        Ok(articles)
    }

    async fn fill_content(&self, mut article: Article) -> Article {
        if !self.extract_full_content {
            article.content = article.summary_fragment();
            return article;
        }

        article.content = match self.extractor.fetch_and_extract(&article.link).await {
            Ok(content) => content,
            Err(e) => {
                warn!(title = %article.title, error = %e, "extraction failed, using summary");
                article.summary_fragment()
            }
        };
        pause(self.pause).await;
        article
    }
}

fn article_from_entry(entry: FeedEntry, source: &str) -> Option<Article> {
    let link = match entry.link {
        Some(link) if is_valid_url(&link) => link,
        other => {
            warn!(title = %entry.title, link = ?other, "skipping entry with invalid link");
            return None;
        }
    };
    debug!(title = %entry.title, %link, "accepted entry");

    Some(Article {
        title: entry.title,
        source: source.to_string(),
        link,
        published: entry.published,
        summary: entry.summary,
        content: String::new(),
    })
}
