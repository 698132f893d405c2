// ABOUTME: Extraction configuration (ExtractionConfig, SiteSelectors, OutputFormat) and the ExtractorBuilder.
// ABOUTME: Defaults reproduce the stock selector and strip tables; the builder offers a fluent API over them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::extractor::Extractor;

/// Desktop browser user agent sent with article requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_SITE_SELECTORS: &[(&str, &str)] = &[
    ("nytimes.com", "article[data-testid='article-container']"),
    ("bbc.com", "article[data-component='text-block']"),
    ("bbc.co.uk", "article[data-component='text-block']"),
    ("theverge.com", "div.duet--article--article-body-component"),
    ("washingtonpost.com", "div.article-body"),
    ("medium.com", "article"),
    ("towardsdatascience.com", "article"),
    ("techcrunch.com", "div.article-content"),
];

const DEFAULT_FALLBACK_SELECTORS: &[&str] = &[
    "article",
    "main",
    "div.content",
    "div.article",
    "div.post",
    ".entry-content",
    "#content",
    ".article__body",
    ".post-content",
    ".story",
    ".story-body",
    "[itemprop='articleBody']",
];

const DEFAULT_STRIP_TAGS: &[&str] = &[
    "script", "style", "iframe", "noscript", "video", "audio", "embed", "object", "canvas",
    "form", "button", "aside", "header", "footer", "nav",
];

const DEFAULT_STRIP_SELECTORS: &[&str] = &[
    ".comments",
    ".social-share",
    ".related-articles",
    ".recommendations",
    ".newsletter-signup",
    ".advertisement",
    ".ad",
    ".popup",
    ".modal",
    ".share",
    ".social",
    ".related",
    ".popular",
    ".trending",
    ".recommended",
    "#comments",
    ".comment-section",
    ".ad-container",
    ".sponsored",
    ".subscribe",
    ".newsletter",
    ".signup",
    ".sidebar",
    ".footer",
    ".header",
];

pub fn default_site_selectors() -> SiteSelectors {
    DEFAULT_SITE_SELECTORS.iter().copied().collect()
}

pub fn default_fallback_selectors() -> Vec<String> {
    to_strings(DEFAULT_FALLBACK_SELECTORS)
}

pub fn default_strip_tags() -> Vec<String> {
    to_strings(DEFAULT_STRIP_TAGS)
}

pub fn default_strip_selectors() -> Vec<String> {
    to_strings(DEFAULT_STRIP_SELECTORS)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Ordered domain-substring to selector table.
///
/// Lookup walks entries in insertion order and the first domain contained in
/// the host wins, so order is part of the configuration. Serializes as a JSON
/// object whose key order is kept on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSelectors(Vec<(String, String)>);

impl SiteSelectors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace the selector for `domain`. Replacing keeps the original position.
    pub fn insert(&mut self, domain: impl Into<String>, selector: impl Into<String>) {
        let domain = domain.into();
        let selector = selector.into();
        match self.0.iter_mut().find(|(d, _)| *d == domain) {
            Some(entry) => entry.1 = selector,
            None => self.0.push((domain, selector)),
        }
    }

    /// Entries whose domain is a substring of `host`, in table order.
    pub fn matching<'a>(&'a self, host: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0
            .iter()
            .filter(move |(domain, _)| !domain.is_empty() && host.contains(domain.as_str()))
            .map(|(d, s)| (d.as_str(), s.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(d, s)| (d.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SiteSelectors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = SiteSelectors::new();
        for (domain, selector) in iter {
            table.insert(domain, selector);
        }
        table
    }
}

impl Serialize for SiteSelectors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (domain, selector) in &self.0 {
            map.serialize_entry(domain, selector)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SiteSelectors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = SiteSelectors;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of domain substrings to selectors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = SiteSelectors::new();
                while let Some((domain, selector)) = access.next_entry::<String, String>()? {
                    table.insert(domain, selector);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Output format for rendered fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => OutputFormat::Markdown,
            "text" | "txt" => OutputFormat::Text,
            _ => OutputFormat::Html,
        }
    }
}

/// Immutable per-run extraction settings, shared read-only across extractions.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub request_timeout: Duration,
    pub extraction_timeout: Duration,
    /// Maximum serialized fragment length, in characters.
    pub max_content_length: usize,
    pub include_images: bool,
    /// Run the density-scoring pass before any selector lookup.
    pub readability: bool,
    pub site_selectors: SiteSelectors,
    pub fallback_selectors: Vec<String>,
    pub strip_tags: Vec<String>,
    pub strip_selectors: Vec<String>,
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            extraction_timeout: Duration::from_secs(15),
            max_content_length: 50_000,
            include_images: false,
            readability: false,
            site_selectors: default_site_selectors(),
            fallback_selectors: default_fallback_selectors(),
            strip_tags: default_strip_tags(),
            strip_selectors: default_strip_selectors(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
    http_client: Option<reqwest::Client>,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ExtractionConfig) -> Self {
        Self {
            config,
            http_client: None,
        }
    }

    /// Set the HTTP request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the wall-clock budget for parsing and cleanup.
    pub fn extraction_timeout(mut self, timeout: Duration) -> Self {
        self.config.extraction_timeout = timeout;
        self
    }

    /// Cap the serialized fragment at `len` characters (never below one).
    pub fn max_content_length(mut self, len: usize) -> Self {
        self.config.max_content_length = len.max(1);
        self
    }

    pub fn include_images(mut self, include: bool) -> Self {
        self.config.include_images = include;
        self
    }

    pub fn readability(mut self, enabled: bool) -> Self {
        self.config.readability = enabled;
        self
    }

    /// Add (or replace) a site-specific selector. New domains go to the end of the table.
    pub fn site_selector(mut self, domain: impl Into<String>, selector: impl Into<String>) -> Self {
        self.config.site_selectors.insert(domain, selector);
        self
    }

    pub fn site_selectors(mut self, table: SiteSelectors) -> Self {
        self.config.site_selectors = table;
        self
    }

    pub fn fallback_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.fallback_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn strip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.strip_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn strip_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.strip_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Extractor {
        Extractor::new(Arc::new(self.config), self.http_client)
    }
}
