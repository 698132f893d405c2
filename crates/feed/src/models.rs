// ABOUTME: Article and feed-entry records passed between fetchers, the filter and document assembly.
// ABOUTME: Article.content holds an HTML fragment set once: extracted body, summary fallback or marker text.

use morning_extract::formats::sanitize_html;
use serde::{Deserialize, Serialize};

/// One story in the paper.
///
/// `published` is kept as the source gave it; it is only parsed when
/// sorting and may not be parseable at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub content: String,
}

impl Article {
    /// Summary wrapped as the fallback body used when extraction is skipped or fails.
    /// Feed summaries are third-party markup and are sanitized first.
    pub fn summary_fragment(&self) -> String {
        format!("<p>{}</p>", sanitize_html(&self.summary))
    }
}

/// Raw item metadata read from an RSS/Atom/JSON feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub published: String,
    pub summary: String,
}
