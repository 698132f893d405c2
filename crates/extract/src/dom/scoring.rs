// ABOUTME: Density-based readability scoring used by the optional primary extraction pass.
// ABOUTME: Scores nodes by paragraph text, commas and class/id weights, then picks and merges the best candidate.

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use crate::extractors::compiled::get_or_compile;

/// Candidates with less visible text than this are never picked.
pub const MIN_CANDIDATE_TEXT: usize = 80;

/// Candidates whose text-to-markup ratio falls below this are mostly markup.
pub const MIN_TEXT_DENSITY: f64 = 0.05;

static PARAGRAPH_SCORE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(p|li|span|pre)$").unwrap());
static CHILD_CONTENT_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(td|blockquote|ol|ul|dl)$").unwrap());
static BAD_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(address|form)$").unwrap());
static NON_TOP_CANDIDATE_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(br|b|i|label|hr|area|base|basefont|input|img|link|meta)$").unwrap()
});
static POSITIVE_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|articlecontent|instapaper_body|blog|body|content|entry-content-asset|entry|hentry|main|Normal|page|pagination|permalink|post|story|text|[-_]copy").unwrap()
});
static NEGATIVE_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)adbox|advert|author|bio|bookmark|bottom|byline|clear|com-|combx|comment|contact|credit|crumb|date|deck|excerpt|featured|foot|footer|footnote|graf|head|info|infotext|instapaper_ignore|jump|linebreak|link|masthead|media|meta|modal|outbrain|promo|pr_|related|respond|roundcontent|scroll|secondary|share|shopping|shoutbox|side|sidebar|sponsor|stamp|sub|summary|tags|tools|widget").unwrap()
});
static PHOTO_HINTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)figure|photo|image|caption").unwrap());
static UNLIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(ad-break|ad-banner|adbox|advert|addthis|agegate|aux|combx|comment|conversation|disqus|extra|foot|header|hidden|loader|login|menu|nav|outbrain|pager|pagination|popup|related|remark|rss|share|shoutbox|sidebar|sociable|sponsor|taboola|tools)").unwrap()
});
static LIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(and|article|body|column|content|entry-content-asset|hentry|main|page|posts|shadow)").unwrap()
});

// hNews parent/child pairs that mark a known article body.
const HNEWS_CONTENT_SELECTORS: &[(&str, &str)] = &[
    (".hentry", ".entry-content"),
    (".entry", ".entry_content"),
    (".post", ".postbody"),
    (".post", ".post-body"),
];

/// Score storage using NodeId as key
pub type NodeScores = HashMap<NodeId, i32>;

fn score_commas(text: &str) -> i32 {
    text.matches(',').count() as i32
}

/// Multi-factor paragraph scoring
fn score_paragraph(text: &str) -> i32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let len = text.chars().count();
    let mut score = score_commas(text) + (len / 50) as i32;

    if len < 20 {
        score -= 10;
    }
    if (50..=200).contains(&len) {
        score += 5;
    }

    score
}

/// Score a node based on tag type
fn score_node(element: &ElementRef) -> i32 {
    let tag_name = element.value().name();

    if PARAGRAPH_SCORE_TAGS.is_match(tag_name) {
        let text = element.text().collect::<String>();
        return score_paragraph(&text);
    }
    if tag_name.eq_ignore_ascii_case("div") {
        return 5;
    }
    if CHILD_CONTENT_TAGS.is_match(tag_name) {
        return 3;
    }
    if BAD_TAGS.is_match(tag_name) {
        return -3;
    }
    if tag_name.eq_ignore_ascii_case("th") {
        return -5;
    }
    0
}

/// Get weight based on className and id patterns
pub fn get_weight(element: &ElementRef) -> i32 {
    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");
    let mut score = 0i32;

    if !id.is_empty() {
        if POSITIVE_SCORE_RE.is_match(id) {
            score += 25;
        }
        if NEGATIVE_SCORE_RE.is_match(id) {
            score -= 25;
        }
    }

    if !class.is_empty() {
        if score == 0 {
            if POSITIVE_SCORE_RE.is_match(class) {
                score += 25;
            }
            if NEGATIVE_SCORE_RE.is_match(class) {
                score -= 25;
            }
        }
        if PHOTO_HINTS_RE.is_match(class) {
            score += 10;
        }
    }

    score
}

/// Ratio of link text to total text, in `[0, 1]`.
pub fn link_density(element: &ElementRef) -> f64 {
    let total_len = element.text().map(str::len).sum::<usize>();
    if total_len == 0 {
        return 0.0;
    }

    let link_len: usize = match get_or_compile("a") {
        Some(a) => element
            .select(&a)
            .map(|link| link.text().map(str::len).sum::<usize>())
            .sum(),
        None => 0,
    };

    (link_len as f64 / total_len as f64).min(1.0)
}

/// Ratio of visible text to serialized markup, in `[0, 1]`.
///
/// Prose-heavy blocks land near the top of the range; blocks that wrap every
/// few characters in their own element land near zero.
pub fn text_density(element: &ElementRef) -> f64 {
    let text_len: usize = element.text().map(|t| t.trim().chars().count()).sum();
    let markup_len = element.html().chars().count();
    if markup_len == 0 || text_len == 0 {
        return 0.0;
    }
    (text_len as f64 / markup_len as f64).min(1.0)
}

/// Check if text ends with sentence-ending punctuation
pub fn has_sentence_end(text: &str) -> bool {
    matches!(
        text.trim().chars().last(),
        Some('.' | '!' | '?' | ':' | ';')
    )
}

/// True for elements whose class/id mark them as boilerplate.
pub fn is_unlikely_candidate(element: &ElementRef) -> bool {
    if element.value().name().eq_ignore_ascii_case("a") {
        return false;
    }

    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");
    if class.is_empty() && id.is_empty() {
        return false;
    }

    let class_and_id = format!("{} {}", class, id);
    if LIKELY_CANDIDATES.is_match(&class_and_id) {
        return false;
    }
    UNLIKELY_CANDIDATES.is_match(&class_and_id)
}

/// Score every paragraph-bearing node in the document.
pub fn score_content(doc: &Html) -> NodeScores {
    fn add_to_parent(element: &ElementRef, score: i32, scores: &mut NodeScores) {
        if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
            let entry = scores.entry(parent.id()).or_insert(0);
            *entry += (score as f64 * 0.25) as i32;
        }
    }

    fn get_or_init_score(element: &ElementRef, scores: &mut NodeScores) -> i32 {
        if let Some(&existing) = scores.get(&element.id()) {
            if existing != 0 {
                return existing;
            }
        }
        let score = score_node(element) + get_weight(element);
        add_to_parent(element, score, scores);
        score
    }

    fn add_score_to(element: &ElementRef, amount: i32, scores: &mut NodeScores) {
        let base = get_or_init_score(element, scores);
        scores.insert(element.id(), base + amount);
    }

    let mut scores = NodeScores::new();

    for (parent_css, child_css) in HNEWS_CONTENT_SELECTORS {
        let (Some(parent_sel), Some(child_sel)) = (
            get_or_compile(parent_css),
            get_or_compile(&format!("{} {}", parent_css, child_css)),
        ) else {
            continue;
        };
        for element in doc.select(&child_sel) {
            let ancestor = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| parent_sel.matches(a));
            if let Some(parent_el) = ancestor {
                add_score_to(&parent_el, 80, &mut scores);
            }
        }
    }

    let Some(paragraphs) = get_or_compile("p, pre") else {
        return scores;
    };
    for element in doc.select(&paragraphs) {
        if scores.contains_key(&element.id()) {
            continue;
        }
        let score = get_or_init_score(&element, &mut scores);
        scores.insert(element.id(), score);

        let raw_score = score_node(&element);
        if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
            add_score_to(&parent, raw_score, &mut scores);
            if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                add_score_to(&grandparent, raw_score / 2, &mut scores);
            }
        }
    }

    scores
}

/// The best scoring element together with its effective score.
///
/// Effective score is the raw score minus a link-density penalty. Body/html,
/// inline tags, boilerplate-looking nodes, and nodes that are too short or too
/// markup-heavy are never candidates.
pub fn find_top_candidate<'a>(doc: &'a Html, scores: &NodeScores) -> Option<(ElementRef<'a>, i32)> {
    let mut best: Option<(ElementRef<'a>, i32)> = None;

    for element in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        let Some(&score) = scores.get(&element.id()) else {
            continue;
        };
        let tag = element.value().name();
        if tag.eq_ignore_ascii_case("body")
            || tag.eq_ignore_ascii_case("html")
            || NON_TOP_CANDIDATE_TAGS.is_match(tag)
            || is_unlikely_candidate(&element)
        {
            continue;
        }

        let text_len: usize = element.text().map(|t| t.trim().chars().count()).sum();
        if text_len < MIN_CANDIDATE_TEXT || text_density(&element) < MIN_TEXT_DENSITY {
            continue;
        }

        let effective = (score as f64 - link_density(&element) * 100.0) as i32;
        if best.as_ref().map_or(true, |(_, s)| effective > *s) {
            best = Some((element, effective));
        }
    }

    best
}

/// Merge siblings that may be part of the main content.
///
/// Returns the candidate's HTML, or a wrapping div around the candidate and
/// every qualifying sibling in document order.
pub fn merge_siblings(candidate: ElementRef, top_score: i32, scores: &NodeScores) -> String {
    let Some(parent) = candidate.parent() else {
        return candidate.html();
    };

    let threshold = 10i32.max((top_score as f64 * 0.25) as i32);
    let candidate_class = candidate.value().attr("class").unwrap_or("");
    let mut included: Vec<ElementRef> = Vec::new();

    for sibling in parent.children().filter_map(ElementRef::wrap) {
        if sibling.id() == candidate.id() {
            included.push(sibling);
            continue;
        }
        if NON_TOP_CANDIDATE_TAGS.is_match(sibling.value().name()) {
            continue;
        }

        let density = link_density(&sibling);
        if density >= 0.5 {
            continue;
        }

        let sibling_score = scores.get(&sibling.id()).copied().unwrap_or(0);
        if sibling_score > 0 {
            let mut bonus = 0;
            if density < 0.05 {
                bonus += 20;
            }
            let sibling_class = sibling.value().attr("class").unwrap_or("");
            if !sibling_class.is_empty() && sibling_class == candidate_class {
                bonus += (top_score as f64 * 0.2) as i32;
            }
            if sibling_score + bonus >= threshold {
                included.push(sibling);
                continue;
            }
        }

        if sibling.value().name().eq_ignore_ascii_case("p") {
            let text = sibling.text().collect::<String>();
            let text_len = text.split_whitespace().collect::<Vec<_>>().join(" ").len();
            if (text_len > 80 && density < 0.25)
                || (text_len <= 80 && density == 0.0 && has_sentence_end(&text))
            {
                included.push(sibling);
            }
        }
    }

    if included.len() <= 1 {
        return candidate.html();
    }

    let mut output = String::from("<div>");
    for node in included {
        output.push_str(&node.html());
    }
    output.push_str("</div>");
    output
}

/// Density pass over a whole document: score, pick, merge.
pub fn extract_best_content(doc: &Html) -> Option<String> {
    let scores = score_content(doc);
    let (candidate, top_score) = find_top_candidate(doc, &scores)?;
    tracing::debug!(
        tag = candidate.value().name(),
        score = top_score,
        "density candidate selected"
    );
    Some(merge_siblings(candidate, top_score, &scores))
}
