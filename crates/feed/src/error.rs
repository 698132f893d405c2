// ABOUTME: Error types for the feed side of the paper: parsing, fetching and configuration.
// ABOUTME: Provides the FeedError enum with Parse, Invalid, Empty, Fetch and Config variants.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while reading feeds or configuration.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Failed to parse the feed data (malformed XML/JSON).
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// The data was parsed but is not usable (missing or out-of-range fields).
    #[error("invalid feed: {0}")]
    Invalid(String),

    /// The feed contains no items.
    #[error("feed is empty: no items found")]
    Empty,

    /// A feed or API request failed.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The configuration file could not be read, parsed or validated.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// Creates a Parse error from an underlying feed-rs error.
    pub fn parse(err: impl fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }

    /// Creates an Invalid error with a custom message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        FeedError::Invalid(msg.into())
    }

    pub fn fetch(url: impl Into<String>, err: impl fmt::Display) -> Self {
        FeedError::Fetch {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub fn config(err: impl fmt::Display) -> Self {
        FeedError::Config(err.to_string())
    }
}
