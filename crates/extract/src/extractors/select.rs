// ABOUTME: Typed selector descriptors (tag name vs CSS) and the MatchNode capability used by the selector tiers.
// ABOUTME: Descriptors are tried in order; the first one that finds a node with visible text wins.

//! Selector descriptors.
//!
//! Configured selector strings are classified once into a
//! [`SelectorDescriptor`]: strings containing `.`, `#` or `[` are CSS, anything
//! else is a bare tag name. Each descriptor answers [`MatchNode::find_first`]
//! against a parsed document; a CSS string that fails to compile simply never
//! matches.

use scraper::{ElementRef, Html};

use crate::extractors::compiled::get_or_compile;

/// Something that can locate a single element in a document.
pub trait MatchNode {
    /// The first matching element in document order, if any.
    fn find_first<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>>;
}

/// A configured selector, classified by how it is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorDescriptor {
    /// Bare element name, matched case-insensitively.
    TagName(String),
    /// CSS selector expression.
    Css(String),
}

impl SelectorDescriptor {
    /// Classify a generic fallback selector string.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains(['.', '#', '[']) {
            SelectorDescriptor::Css(raw.to_string())
        } else {
            SelectorDescriptor::TagName(raw.to_ascii_lowercase())
        }
    }

    /// Site-specific selectors are always CSS.
    pub fn css(raw: &str) -> Self {
        SelectorDescriptor::Css(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            SelectorDescriptor::TagName(s) | SelectorDescriptor::Css(s) => s,
        }
    }
}

impl MatchNode for SelectorDescriptor {
    fn find_first<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            SelectorDescriptor::TagName(name) => {
                if name.is_empty() {
                    return None;
                }
                doc.root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name().eq_ignore_ascii_case(name))
            }
            SelectorDescriptor::Css(css) => {
                let selector = get_or_compile(css)?;
                doc.select(&selector).next()
            }
        }
    }
}

/// True when the element carries any non-whitespace text.
pub fn has_visible_text(el: &ElementRef) -> bool {
    el.text().any(|t| !t.trim().is_empty())
}

/// Tries each descriptor in order and returns the first match with visible text,
/// together with the descriptor that produced it.
pub fn first_match<'a, 'd, M: MatchNode>(
    doc: &'a Html,
    descriptors: &'d [M],
) -> Option<(&'d M, ElementRef<'a>)> {
    descriptors.iter().find_map(|descriptor| {
        descriptor
            .find_first(doc)
            .filter(has_visible_text)
            .map(|el| (descriptor, el))
    })
}
