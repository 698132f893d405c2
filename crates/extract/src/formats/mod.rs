// ABOUTME: Output format converters for extracted fragments and third-party HTML.
// ABOUTME: sanitize_html (ammonia), html_to_markdown (htmd) and html_to_text (scraper text nodes).

//! Output format conversion.
//!
//! Extracted fragments are HTML; these helpers turn them into Markdown or
//! plain text, and sanitize HTML that comes from outside the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::options::OutputFormat;

static BR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static THREE_PLUS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static TWO_PLUS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Sanitize HTML with an article-oriented ammonia policy.
///
/// Allowed elements: p, br, strong, b, em, i, u, h1-h6, ul, ol, li, blockquote, pre, code,
/// img, a, span, div. Links keep `href`, images keep `src`/`alt`/size attributes,
/// and `class` survives on div/span/p so styling hooks like `hn-text` still apply.
pub fn sanitize_html(html: &str) -> String {
    let allowed_tags = [
        "p", "br", "strong", "b", "em", "i", "u", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
        "li", "blockquote", "pre", "code", "img", "a", "span", "div",
    ];

    let mut builder = ammonia::Builder::new();
    builder.tags(allowed_tags.iter().copied().collect());

    builder.add_tag_attributes("a", &["href"]);
    builder.add_tag_attributes("img", &["src", "alt", "width", "height"]);
    builder.add_tag_attributes("div", &["class"]);
    builder.add_tag_attributes("span", &["class"]);
    builder.add_tag_attributes("p", &["class"]);

    builder
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .clean(html)
        .to_string()
}

/// Convert HTML to Markdown using htmd.
///
/// On conversion error, returns the input unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = BR_TAG.replace_all(html, "\n");

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.to_string());

    THREE_PLUS_NEWLINES.replace_all(&md, "\n\n").to_string()
}

/// Convert HTML to plain text by extracting text nodes.
///
/// `<br>` becomes a newline, runs of blank lines collapse to one, and the
/// result is trimmed.
pub fn html_to_text(html: &str) -> String {
    let preprocessed = BR_TAG.replace_all(html, "\n");

    let document = Html::parse_document(&preprocessed);
    let raw_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

    let normalized = HORIZONTAL_SPACE.replace_all(&raw_text, " ");
    let collapsed = TWO_PLUS_NEWLINES.replace_all(&normalized, "\n");
    collapsed.trim().to_string()
}

/// Render an extracted fragment in the requested format.
pub fn render(html: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Html => html.to_string(),
        OutputFormat::Markdown => html_to_markdown(html),
        OutputFormat::Text => html_to_text(html),
    }
}
