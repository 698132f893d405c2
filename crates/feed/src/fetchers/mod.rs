// ABOUTME: Article sources: RSS/Atom feeds and the Hacker News API.
// ABOUTME: Both fetch sequentially with a fixed pause after each article so no origin is hammered.

pub mod hackernews;
pub mod rss;

pub use hackernews::HackerNewsFetcher;
pub use rss::RssFetcher;

use std::time::Duration;

use crate::error::FeedError;

/// GET `url` and return the body, treating any non-2xx status as a fetch error.
pub(crate) async fn get_bytes(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<bytes::Bytes, FeedError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FeedError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::fetch(url, format!("HTTP {}", status.as_u16())));
    }

    response.bytes().await.map_err(|e| FeedError::fetch(url, e))
}

pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
