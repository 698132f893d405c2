// ABOUTME: The extraction pipeline: raw page bytes in, a cleaned article fragment out.
// ABOUTME: Tiers are readability, site selector, generic selectors, paragraph salvage; then cleanup and the length cap.

//! Article extraction.
//!
//! [`extract`] runs the whole pipeline on the calling thread without a
//! deadline; [`extract_with_deadline`] runs it on a worker under the
//! configured extraction budget. Both share [`extract_with_token`], which
//! checks its [`CancelToken`] between stages so an abandoned extraction stops
//! early instead of running to completion in the background.

use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

use crate::deadline::{run_with_token, CancelToken};
use crate::dom::cleanup::{cap_length, Fragment};
use crate::dom::scoring;
use crate::error::ExtractError;
use crate::extractors::compiled::get_or_compile;
use crate::extractors::select::{first_match, SelectorDescriptor};
use crate::options::ExtractionConfig;
use crate::resource::decode_body;
use crate::urls::{host_of, is_web_page_url};

/// Input beyond this many bytes is ignored.
pub const MAX_INPUT_BYTES: usize = 500_000;

/// Paragraphs collected by the salvage tier.
pub const SALVAGE_PARAGRAPHS: usize = 20;

/// Fragment returned for links to downloads instead of pages.
pub fn file_placeholder(url: &str) -> String {
    format!(
        "<p><em>This article links to a file that cannot be displayed in the paper. View the original at:</em> {}</p>",
        url
    )
}

/// Which strategy produced the working fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Readability,
    Site,
    Fallback,
    Salvage,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Readability => "readability",
            Tier::Site => "site",
            Tier::Fallback => "fallback",
            Tier::Salvage => "salvage",
        };
        write!(f, "{}", s)
    }
}

/// Extract the article fragment from `html_bytes` fetched from `url`.
pub fn extract(
    url: &str,
    html_bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<String, ExtractError> {
    extract_with_token(url, html_bytes, None, config, &CancelToken::unbounded())
}

/// [`extract`] bounded by `config.extraction_timeout`.
pub fn extract_with_deadline(
    url: &str,
    html_bytes: Vec<u8>,
    content_type: Option<String>,
    config: Arc<ExtractionConfig>,
) -> Result<String, ExtractError> {
    let budget = config.extraction_timeout;
    let owned_url = url.to_string();
    run_with_token(budget, move |token| {
        extract_with_token(
            &owned_url,
            &html_bytes,
            content_type.as_deref(),
            &config,
            &token,
        )
    })
    .map_err(|e| ExtractError::from_timeout(url, "Extract", e))?
}

/// The pipeline proper. `content_type` is an optional charset hint.
#[instrument(skip_all, fields(%url))]
pub fn extract_with_token(
    url: &str,
    html_bytes: &[u8],
    content_type: Option<&str>,
    config: &ExtractionConfig,
    token: &CancelToken,
) -> Result<String, ExtractError> {
    if !is_web_page_url(url) {
        debug!("file link, not parsed");
        return Ok(file_placeholder(url));
    }

    let checkpoint =
        |op: &str| token.check().map_err(|e| ExtractError::from_timeout(url, op, e));

    let capped = &html_bytes[..html_bytes.len().min(MAX_INPUT_BYTES)];
    let html = decode_body(capped, content_type);
    if html.trim().is_empty() {
        return Err(ExtractError::parse(
            url,
            "Extract",
            Some(anyhow::anyhow!("document is empty")),
        ));
    }
    checkpoint("Decode")?;

    let doc = Html::parse_document(&html);
    checkpoint("Parse")?;

    let (tier, working) = locate(&doc, url, config, token)
        .map_err(|e| ExtractError::from_timeout(url, "Locate", e))?;
    drop(doc);
    debug!(%tier, bytes = working.len(), "fragment located");

    let mut fragment = Fragment::parse(&working);
    fragment.strip_tags(&config.strip_tags);
    checkpoint("Clean")?;
    fragment.strip_selectors(&config.strip_selectors);
    checkpoint("Clean")?;
    fragment.normalize_images(config.include_images, url);
    fragment.flatten_links();
    fragment.drop_empty_blocks();
    checkpoint("Clean")?;

    if !fragment.has_visible_text() {
        return Err(ExtractError::empty(url, "Clean"));
    }

    let serialized = fragment.serialize();
    let length = serialized.chars().count();
    if length > config.max_content_length {
        debug!(length, max = config.max_content_length, "fragment truncated");
    }
    Ok(cap_length(serialized, config.max_content_length))
}

/// Runs the tiers in order and returns the first fragment found.
fn locate(
    doc: &Html,
    url: &str,
    config: &ExtractionConfig,
    token: &CancelToken,
) -> Result<(Tier, String), crate::deadline::TimeoutError> {
    if config.readability {
        if let Some(best) = scoring::extract_best_content(doc) {
            return Ok((Tier::Readability, best));
        }
        token.check()?;
    }

    let host = host_of(url);
    let site: Vec<SelectorDescriptor> = config
        .site_selectors
        .matching(&host)
        .map(|(_, css)| SelectorDescriptor::css(css))
        .collect();
    if let Some((descriptor, el)) = first_match(doc, &site) {
        debug!(selector = descriptor.as_str(), "site selector matched");
        return Ok((Tier::Site, enclosed_html(&el)));
    }
    token.check()?;

    let fallback: Vec<SelectorDescriptor> = config
        .fallback_selectors
        .iter()
        .map(|raw| SelectorDescriptor::classify(raw))
        .collect();
    if let Some((descriptor, el)) = first_match(doc, &fallback) {
        debug!(selector = descriptor.as_str(), "fallback selector matched");
        return Ok((Tier::Fallback, enclosed_html(&el)));
    }
    token.check()?;

    Ok((Tier::Salvage, salvage_paragraphs(doc)))
}

/// The element's markup, wrapped in the containers it needs to survive a
/// fragment parse. A bare `<td>` or `<li>` would otherwise lose its own tag.
fn enclosed_html(el: &ElementRef) -> String {
    let html = el.html();
    let name = el.value().name().to_ascii_lowercase();
    let parent = el
        .parent()
        .and_then(|p| p.value().as_element().map(|e| e.name().to_ascii_lowercase()));
    match name.as_str() {
        "td" | "th" => format!("<table><tbody><tr>{}</tr></tbody></table>", html),
        "tr" => format!("<table><tbody>{}</tbody></table>", html),
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => {
            format!("<table>{}</table>", html)
        }
        "li" => {
            let list = match parent.as_deref() {
                Some(list @ ("ol" | "menu")) => list.to_string(),
                _ => "ul".to_string(),
            };
            format!("<{list}>{html}</{list}>")
        }
        "dt" | "dd" => format!("<dl>{}</dl>", html),
        _ => html,
    }
}

/// The first paragraphs of the page wrapped in one container.
fn salvage_paragraphs(doc: &Html) -> String {
    let mut output = String::from("<div>");
    if let Some(p) = get_or_compile("p") {
        for paragraph in doc.select(&p).take(SALVAGE_PARAGRAPHS) {
            output.push_str(&paragraph.html());
        }
    }
    output.push_str("</div>");
    output
}
