// ABOUTME: The working fragment: a parsed subtree cleaned in place, then serialized back to HTML.
// ABOUTME: Strips boilerplate, normalizes images, flattens links, drops empty blocks and caps the output length.

//! Fragment cleanup.
//!
//! A [`Fragment`] owns one parsed tree for the duration of a single
//! extraction. Removals detach nodes from the tree directly; image source
//! rewrites and link flattening are recorded per node and applied when the
//! fragment is serialized.

use std::collections::{HashMap, HashSet};

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node};

use crate::extractors::compiled::get_or_compile;
use crate::urls::origin_of;

/// Appended to fragments cut at the configured maximum length.
pub const TRUNCATION_MARKER: &str = "... [Content truncated due to length]";

/// One extraction's working tree.
pub struct Fragment {
    doc: Html,
    img_src: HashMap<NodeId, String>,
    flattened_links: HashSet<NodeId>,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_fragment(html),
            img_src: HashMap::new(),
            flattened_links: HashSet::new(),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.doc
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    fn detach_all(&mut self, ids: Vec<NodeId>) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(mut node) = self.doc.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    /// Removes every element whose tag name is in `tags` (case-insensitive).
    pub fn strip_tags(&mut self, tags: &[String]) -> usize {
        let ids: Vec<NodeId> = self
            .elements()
            .filter(|el| {
                let name = el.value().name();
                tags.iter().any(|t| t.eq_ignore_ascii_case(name))
            })
            .map(|el| el.id())
            .collect();
        self.detach_all(ids)
    }

    /// Removes every element matching any of `selectors`. Invalid selectors match nothing.
    pub fn strip_selectors(&mut self, selectors: &[String]) -> usize {
        let mut ids = Vec::new();
        for css in selectors {
            let Some(selector) = get_or_compile(css) else {
                continue;
            };
            ids.extend(self.doc.select(&selector).map(|el| el.id()));
        }
        self.detach_all(ids)
    }

    /// Keeps http(s) images and absolutizes root-relative ones against
    /// `page_url`; every other image is removed. With `include` off, all
    /// images are removed.
    pub fn normalize_images(&mut self, include: bool, page_url: &str) {
        let origin = origin_of(page_url);
        let mut doomed = Vec::new();
        let mut rewrites = Vec::new();

        for img in self
            .elements()
            .filter(|el| el.value().name().eq_ignore_ascii_case("img"))
        {
            if !include {
                doomed.push(img.id());
                continue;
            }
            let src = img.value().attr("src").unwrap_or("").trim();
            if src.starts_with("http://") || src.starts_with("https://") {
                continue;
            }
            match (&origin, src.starts_with('/') && !src.starts_with("//")) {
                (Some(origin), true) => rewrites.push((img.id(), format!("{}{}", origin, src))),
                _ => doomed.push(img.id()),
            }
        }

        self.img_src.extend(rewrites);
        self.detach_all(doomed);
    }

    /// Marks anchors to be replaced by their plain text, except anchors
    /// whose only child is an image.
    pub fn flatten_links(&mut self) {
        let ids: Vec<NodeId> = self
            .elements()
            .filter(|el| el.value().name().eq_ignore_ascii_case("a"))
            .filter(|a| !is_image_only(a))
            .map(|a| a.id())
            .collect();
        self.flattened_links.extend(ids);
    }

    /// Removes `p` and `div` elements whose text is empty or whitespace.
    pub fn drop_empty_blocks(&mut self) -> usize {
        let ids: Vec<NodeId> = self
            .elements()
            .filter(|el| {
                let name = el.value().name();
                name.eq_ignore_ascii_case("p") || name.eq_ignore_ascii_case("div")
            })
            .filter(|el| el.text().all(|t| t.trim().is_empty()))
            .map(|el| el.id())
            .collect();
        self.detach_all(ids)
    }

    pub fn has_visible_text(&self) -> bool {
        self.doc
            .root_element()
            .text()
            .any(|t| !t.trim().is_empty())
    }

    /// Serializes the cleaned tree.
    pub fn serialize(&self) -> String {
        let mut output = String::new();
        for child in self.doc.root_element().children() {
            self.serialize_node(child, false, &mut output);
        }
        output
    }

    fn serialize_node(&self, node: ego_tree::NodeRef<Node>, raw_text: bool, output: &mut String) {
        match node.value() {
            Node::Text(text) => {
                if raw_text {
                    output.push_str(&**text);
                } else {
                    output.push_str(&escape_text(&**text));
                }
            }
            Node::Element(el) => {
                if self.flattened_links.contains(&node.id()) {
                    let text: String = node
                        .descendants()
                        .filter_map(|d| d.value().as_text().map(|t| &**t))
                        .collect();
                    output.push_str(&escape_text(&text));
                    return;
                }

                let tag_name = el.name();
                output.push('<');
                output.push_str(tag_name);

                let rewritten = self.img_src.get(&node.id());
                for (name, value) in el.attrs() {
                    let value = match rewritten {
                        Some(src) if name == "src" => src.as_str(),
                        _ => value,
                    };
                    if is_unsafe_attr(name, value) {
                        continue;
                    }
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&escape_attr(value));
                    output.push('"');
                }

                if is_void_element(tag_name) {
                    output.push_str(" />");
                    return;
                }
                output.push('>');

                let raw = matches!(tag_name.to_ascii_lowercase().as_str(), "script" | "style");
                for child in node.children() {
                    self.serialize_node(child, raw, output);
                }

                output.push_str("</");
                output.push_str(tag_name);
                output.push('>');
            }
            Node::Comment(comment) => {
                output.push_str("<!--");
                output.push_str(&**comment);
                output.push_str("-->");
            }
            _ => {}
        }
    }
}

/// Event handlers, inline styles and script-capable URLs never leave the fragment.
fn is_unsafe_attr(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") || name == "style" || name == "srcdoc" {
        return true;
    }
    if !matches!(
        name.as_str(),
        "href" | "src" | "action" | "formaction" | "poster" | "background"
    ) {
        return false;
    }
    // Browsers ignore embedded whitespace and control characters in the scheme.
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || (compact.starts_with("data:") && !compact.starts_with("data:image/"))
}

fn is_image_only(anchor: &ElementRef) -> bool {
    let mut children = anchor.children().filter(|child| match child.value() {
        Node::Text(t) => !t.trim().is_empty(),
        Node::Comment(_) => false,
        _ => true,
    });
    let only_image = children.next().is_some_and(|child| {
        child
            .value()
            .as_element()
            .is_some_and(|el| el.name().eq_ignore_ascii_case("img"))
    });
    only_image && children.next().is_none()
}

/// Cuts `html` to `max_chars` characters and appends [`TRUNCATION_MARKER`]
/// when it is longer than that; returns it unchanged otherwise.
pub fn cap_length(html: String, max_chars: usize) -> String {
    match html.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = html[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => html,
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes special characters in attribute values.
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Checks if a tag is a void element (self-closing in HTML5).
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
