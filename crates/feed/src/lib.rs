// ABOUTME: Feed side of the morning paper: article sources, configuration, filtering and assembly.
// ABOUTME: Re-exports AppConfig, the RSS and Hacker News fetchers, filter_and_sort and assemble.

//! Morning Feed - gathers articles and puts them in paper order.
//!
//! Fetchers turn feeds and the Hacker News API into [`Article`]s, using
//! `morning-extract` for full bodies. [`filter_and_sort`] drops unusable
//! articles and orders the rest newest first; [`assemble`] groups them by
//! source for rendering.

pub mod assembly;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod models;
pub mod parser;

pub use assembly::{assemble, Paper, Section};
pub use config::{AppConfig, ApiEndpoints, FeedConfig, HackerNewsConfig, TimeoutConfig};
pub use dates::parse_published;
pub use error::FeedError;
pub use fetchers::{HackerNewsFetcher, RssFetcher};
pub use filter::{filter_and_sort, filter_and_sort_at, FilterRules, Rejection};
pub use models::{Article, FeedEntry};
pub use parser::parse_feed_bytes;
