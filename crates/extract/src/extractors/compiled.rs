// ABOUTME: Process-wide cache of compiled CSS selectors keyed by their source text.
// ABOUTME: Invalid selectors are cached as None so they are parsed once and then treated as "no match".

//! Selector caching for repeated lookups.
//!
//! The same configured selectors run against every article in a batch, so
//! each string is compiled once and shared by all extractions.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` for selectors that fail to parse. A poisoned lock only
/// costs the cache: the selector is compiled fresh.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if compiled.is_none() {
        tracing::debug!(selector = css, "ignoring invalid selector");
    }
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        cache
            .entry(css.to_string())
            .or_insert_with(|| compiled.clone());
    }
    compiled
}
