// ABOUTME: Feed parsing using feed-rs, reduced to the entry metadata the paper needs.
// ABOUTME: Maps RSS, Atom and JSON Feed entries to FeedEntry with title/date defaults applied.

use feed_rs::model::{Entry, Link};

use crate::error::FeedError;
use crate::models::FeedEntry;

pub const DEFAULT_TITLE: &str = "No title";
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Parses feed bytes into entries, in document order.
///
/// # Returns
/// * `Ok(entries)` - at least one entry was found
/// * `Err(FeedError::Parse)` - the bytes are not a recognizable feed
/// * `Err(FeedError::Empty)` - the feed parsed but has no entries
pub fn parse_feed_bytes(data: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let parsed = feed_rs::parser::parse(data).map_err(FeedError::parse)?;
    if parsed.entries.is_empty() {
        return Err(FeedError::Empty);
    }
    Ok(parsed.entries.iter().map(map_entry).collect())
}

fn map_entry(entry: &Entry) -> FeedEntry {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    // Feeds that only carry a full body still get a summary.
    let summary = entry
        .summary
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            entry
                .content
                .as_ref()
                .and_then(|c| c.body.as_ref())
                .map(|b| b.trim().to_string())
        })
        .unwrap_or_default();

    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    FeedEntry {
        title,
        link: extract_item_url(entry),
        published,
        summary,
    }
}

fn extract_item_url(entry: &Entry) -> Option<String> {
    let href = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.iter().find(|l| !is_enclosure_link(l)))
        .map(|l| l.href.trim().to_string())
        .unwrap_or_else(|| entry.id.trim().to_string());

    if href.is_empty() {
        None
    } else {
        Some(href)
    }
}

fn is_enclosure_link(link: &Link) -> bool {
    link.rel.as_deref() == Some("enclosure")
}
