// ABOUTME: Selector machinery for locating the article subtree in a page.
// ABOUTME: Holds the compiled-selector cache and the typed tag/CSS selector descriptors.

//! Selector-based lookup.
//!
//! Submodules:
//! - `compiled`: process-wide cache of compiled CSS selectors.
//! - `select`: `SelectorDescriptor` and the `MatchNode` capability.

pub mod compiled;
pub mod select;
