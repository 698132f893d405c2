// ABOUTME: Syntactic URL checks used before fetching or extracting an article.
// ABOUTME: is_valid_url requires scheme and host; is_web_page_url rejects document/media/archive downloads.

use url::Url;

/// Path suffixes that point at downloads rather than readable pages.
pub const NON_HTML_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz",
    ".mp3", ".mp4", ".avi", ".mov", ".exe", ".dmg", ".apk", ".iso",
];

/// True iff `s` parses as a URL with a non-empty scheme and a non-empty host.
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s.trim()) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// False when the URL path ends with a known non-HTML file extension.
///
/// Purely syntactic. Strings that do not parse as absolute URLs are judged by
/// their raw path portion so the check never needs the network.
pub fn is_web_page_url(url: &str) -> bool {
    let path = match Url::parse(url.trim()) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };

    !NON_HTML_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Scheme plus host (and explicit port) of `url`, used to absolutize root-relative paths.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}", parsed.scheme(), host)),
    }
}

/// Lowercased host of `url`, or an empty string when there is none.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_urls_need_scheme_and_host() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/path?q=1"));
        assert!(is_valid_url("ftp://files.example.com/a.txt"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com/path"));
        assert!(!is_valid_url("/relative/path"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("file:///etc/passwd"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn file_extensions_are_not_web_pages() {
        for ext in NON_HTML_EXTENSIONS {
            let url = format!("https://example.com/files/report{}", ext);
            assert!(!is_web_page_url(&url), "{} should be rejected", url);
        }
    }

    #[test]
    fn extension_check_is_case_insensitive_and_ignores_query() {
        assert!(!is_web_page_url("https://example.com/Paper.PDF"));
        assert!(!is_web_page_url("https://example.com/paper.pdf?download=1"));
        assert!(is_web_page_url("https://example.com/view?file=paper.pdf"));
    }

    #[test]
    fn ordinary_pages_are_web_pages() {
        assert!(is_web_page_url("https://example.com/"));
        assert!(is_web_page_url("https://example.com/2024/01/story.html"));
        assert!(is_web_page_url("https://example.com/pdf-guide"));
        assert!(is_web_page_url("https://news.ycombinator.com/item?id=1"));
    }

    #[test]
    fn unparsable_input_is_judged_by_raw_path() {
        assert!(!is_web_page_url("files/manual.docx"));
        assert!(is_web_page_url("files/manual"));
    }

    #[test]
    fn origin_keeps_explicit_port() {
        assert_eq!(
            origin_of("https://example.com/a/b"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            origin_of("http://127.0.0.1:8080/x"),
            Some("http://127.0.0.1:8080".to_string())
        );
        assert_eq!(origin_of("nope"), None);
    }

    #[test]
    fn host_is_lowercased() {
        assert_eq!(host_of("https://WWW.BBC.co.uk/news"), "www.bbc.co.uk");
        assert_eq!(host_of("garbage"), "");
    }
}
