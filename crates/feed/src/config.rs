// ABOUTME: JSON application configuration: feeds, Hacker News endpoints, timeouts and extraction tables.
// ABOUTME: Loads with serde defaults, writes a default file when missing, validates ranges, derives ExtractionConfig.

use std::fs;
use std::path::Path;
use std::time::Duration;

use morning_extract::options::{
    default_fallback_selectors, default_site_selectors, default_strip_selectors,
    default_strip_tags, DEFAULT_USER_AGENT,
};
use morning_extract::{ExtractionConfig, SiteSelectors};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::FeedError;
use crate::filter::{FilterRules, DEFAULT_MIN_CONTENT_LENGTH};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const MAX_ARTICLES_RANGE: (usize, usize) = (1, 20);
const REQUEST_TIMEOUT_RANGE: (u64, u64) = (1, 60);
const EXTRACTION_TIMEOUT_RANGE: (u64, u64) = (1, 120);
const CONTENT_LENGTH_RANGE: (usize, usize) = (1000, 500_000);
const COLUMNS_RANGE: (u8, u8) = (1, 3);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub top_stories: String,
    /// Item URL template; `{}` is replaced by the story id.
    pub item: String,
    /// Discussion page template; `{}` is replaced by the story id.
    pub discussion_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            top_stories: "https://hacker-news.firebaseio.com/v0/topstories.json".to_string(),
            item: "https://hacker-news.firebaseio.com/v0/item/{}.json".to_string(),
            discussion_url: "https://news.ycombinator.com/item?id={}".to_string(),
        }
    }
}

impl ApiEndpoints {
    pub fn item_url(&self, id: u64) -> String {
        self.item.replacen("{}", &id.to_string(), 1)
    }

    pub fn discussion(&self, id: u64) -> String {
        self.discussion_url.replacen("{}", &id.to_string(), 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub include: bool,
    pub max_articles: usize,
    pub only_self_posts: bool,
    pub api_endpoints: ApiEndpoints,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            include: true,
            max_articles: default_max_articles(),
            only_self_posts: true,
            api_endpoints: ApiEndpoints::default(),
        }
    }
}

/// Timeouts in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub request: u64,
    pub extraction: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: 10,
            extraction: 15,
        }
    }
}

/// Top-level configuration file. Unknown top-level keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rss_feeds: Vec<FeedConfig>,
    pub hacker_news: HackerNewsConfig,
    pub output_directory: String,
    pub newspaper_title: String,
    pub columns: u8,
    pub extract_full_content: bool,
    pub include_images: bool,
    pub timeout: TimeoutConfig,
    pub max_content_length: usize,
    pub site_specific_selectors: SiteSelectors,
    pub fallback_selectors: Vec<String>,
    pub elements_to_remove: Vec<String>,
    pub class_selectors_to_remove: Vec<String>,
    pub min_content_length: usize,
    pub readability: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rss_feeds: vec![
                FeedConfig {
                    name: "BBC News".to_string(),
                    url: "http://feeds.bbci.co.uk/news/world/rss.xml".to_string(),
                    max_articles: 5,
                },
                FeedConfig {
                    name: "New York Times".to_string(),
                    url: "https://rss.nytimes.com/services/xml/rss/nyt/World.xml".to_string(),
                    max_articles: 5,
                },
            ],
            hacker_news: HackerNewsConfig::default(),
            output_directory: "./papers".to_string(),
            newspaper_title: "Morning Paper".to_string(),
            columns: 1,
            extract_full_content: true,
            include_images: false,
            timeout: TimeoutConfig::default(),
            max_content_length: 50_000,
            site_specific_selectors: default_site_selectors(),
            fallback_selectors: default_fallback_selectors(),
            elements_to_remove: default_strip_tags(),
            class_selectors_to_remove: default_strip_selectors(),
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            readability: false,
        }
    }
}

fn default_max_articles() -> usize {
    5
}

impl AppConfig {
    /// Load `path`, or write and return the defaults when it does not exist.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "config file not found, writing defaults");
            let config = AppConfig::default();
            config.save(path)?;
            return Ok(config);
        }
        Self::load(path)
    }

    /// Load and validate an existing file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| FeedError::config(format!("{}: {}", path.display(), e)))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .map_err(|e| FeedError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON with four-space indentation.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FeedError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(FeedError::config)?;
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser).map_err(FeedError::config)?;
        buf.push(b'\n');

        fs::write(path, buf).map_err(|e| FeedError::config(format!("{}: {}", path.display(), e)))
    }

    /// Check every range and format rule, reporting the first violation.
    pub fn validate(&self) -> Result<(), FeedError> {
        for feed in &self.rss_feeds {
            if !is_http_url(&feed.url) {
                return Err(FeedError::config(format!(
                    "feed {:?}: url {:?} is not a valid http(s) URL",
                    feed.name, feed.url
                )));
            }
            check_range(
                &format!("feed {:?} max_articles", feed.name),
                feed.max_articles,
                MAX_ARTICLES_RANGE,
            )?;
        }

        let hn = &self.hacker_news;
        check_range("hacker_news.max_articles", hn.max_articles, MAX_ARTICLES_RANGE)?;
        if !is_http_url(&hn.api_endpoints.top_stories) {
            return Err(FeedError::config(
                "hacker_news.api_endpoints.top_stories is not a valid http(s) URL",
            ));
        }
        for (field, template) in [
            ("item", &hn.api_endpoints.item),
            ("discussion_url", &hn.api_endpoints.discussion_url),
        ] {
            if !template.contains("{}") {
                return Err(FeedError::config(format!(
                    "hacker_news.api_endpoints.{} must contain '{{}}' for the id",
                    field
                )));
            }
        }

        check_range("timeout.request", self.timeout.request, REQUEST_TIMEOUT_RANGE)?;
        check_range(
            "timeout.extraction",
            self.timeout.extraction,
            EXTRACTION_TIMEOUT_RANGE,
        )?;
        check_range(
            "max_content_length",
            self.max_content_length,
            CONTENT_LENGTH_RANGE,
        )?;
        check_range("columns", self.columns, COLUMNS_RANGE)?;
        Ok(())
    }

    /// The immutable settings handed to every extraction in a run.
    pub fn extraction(&self) -> ExtractionConfig {
        ExtractionConfig {
            request_timeout: Duration::from_secs(self.timeout.request),
            extraction_timeout: Duration::from_secs(self.timeout.extraction),
            max_content_length: self.max_content_length,
            include_images: self.include_images,
            readability: self.readability,
            site_selectors: self.site_specific_selectors.clone(),
            fallback_selectors: self.fallback_selectors.clone(),
            strip_tags: self.elements_to_remove.clone(),
            strip_selectors: self.class_selectors_to_remove.clone(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            min_content_length: self.min_content_length,
        }
    }
}

fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn check_range<T>(field: &str, value: T, (min, max): (T, T)) -> Result<(), FeedError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(FeedError::config(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}
