// ABOUTME: DOM passes over scraper's HTML tree used by the extraction pipeline.
// ABOUTME: scoring picks a main-content candidate by text density; cleanup reduces and serializes the fragment.

//! DOM utilities for article extraction.
//!
//! - `scoring`: density-based candidate selection for the optional readability pass.
//! - `cleanup`: the working [`Fragment`](cleanup::Fragment) and the length cap.

pub mod cleanup;
pub mod scoring;
