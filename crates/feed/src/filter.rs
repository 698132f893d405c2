// ABOUTME: Article filter and sorter: drops short, failed or file-link articles and orders the rest newest first.
// ABOUTME: Unparsable dates get a repeatable placeholder key from the batch time and an FNV-1a hash of title|link.

use std::fmt;

use aho_corasick::AhoCorasick;
use chrono::{DateTime, Utc};
use morning_extract::is_web_page_url;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::dates::parse_published;
use crate::models::Article;

pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 200;

/// Substrings that mark content as a skip or failure placeholder rather than an article body.
pub const FAILURE_MARKERS: &[&str] = &[
    "This article links to a file",
    "Content extraction failed",
    "Content extraction timed out",
];

static MARKER_MATCHER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(FAILURE_MARKERS).expect("failure markers are valid patterns"));

// Spread of placeholder keys around the batch time, in milliseconds.
const PLACEHOLDER_SPREAD_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    /// Minimum content length in characters.
    pub min_content_length: usize,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
        }
    }
}

/// Why an article was left out of the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    FailureMarker,
    PdfTitle,
    FileLink,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::TooShort => "content too short",
            Rejection::FailureMarker => "failure marker in content",
            Rejection::PdfTitle => "pdf in title",
            Rejection::FileLink => "link points to a file",
        };
        write!(f, "{}", s)
    }
}

/// Returns the first rule `article` breaks, if any.
pub fn rejection(article: &Article, rules: &FilterRules) -> Option<Rejection> {
    if article.content.chars().count() < rules.min_content_length {
        return Some(Rejection::TooShort);
    }
    if MARKER_MATCHER.is_match(&article.content) {
        return Some(Rejection::FailureMarker);
    }
    if article.title.to_lowercase().contains("pdf") {
        return Some(Rejection::PdfTitle);
    }
    if !is_web_page_url(&article.link) {
        return Some(Rejection::FileLink);
    }
    None
}

/// Filters a batch and sorts the survivors newest first, using the current time for placeholders.
pub fn filter_and_sort(articles: Vec<Article>, rules: &FilterRules) -> Vec<Article> {
    filter_and_sort_at(articles, rules, Utc::now())
}

/// Same as [`filter_and_sort`] with an explicit batch time.
///
/// Every article that passes the rules is returned. Articles with a parseable
/// `published` string sort strictly by that instant; the rest are keyed near
/// `now`, so they usually lead the paper.
pub fn filter_and_sort_at(
    articles: Vec<Article>,
    rules: &FilterRules,
    now: DateTime<Utc>,
) -> Vec<Article> {
    let total = articles.len();
    let mut kept: Vec<(i64, Article)> = articles
        .into_iter()
        .filter(|article| match rejection(article, rules) {
            Some(reason) => {
                debug!(title = %article.title, %reason, "article filtered out");
                false
            }
            None => true,
        })
        .map(|article| (sort_key(&article, now), article))
        .collect();

    kept.sort_by(|(a, _), (b, _)| b.cmp(a));
    debug!(total, kept = kept.len(), "filtered articles");
    kept.into_iter().map(|(_, article)| article).collect()
}

/// Milliseconds since the epoch used for ordering `article`.
pub fn sort_key(article: &Article, now: DateTime<Utc>) -> i64 {
    match parse_published(&article.published) {
        Some(dt) => dt.timestamp_millis(),
        None => {
            let identity = format!("{}|{}", article.title, article.link);
            now.timestamp_millis() + (fnv1a(identity.as_bytes()) % PLACEHOLDER_SPREAD_MS) as i64
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}
