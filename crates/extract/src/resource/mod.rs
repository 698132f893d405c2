// ABOUTME: HTTP fetch collaborator for article pages plus body charset decoding.
// ABOUTME: Transport timeouts surface as ErrorCode::Timeout, other failures and non-2xx statuses as ErrorCode::Fetch.

use std::time::Duration;

use bytes::Bytes;

use crate::error::ExtractError;

/// Raw page bytes plus the charset hint needed to decode them.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Decode body bytes to a String using charset from content-type header or detection.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn transport_error(url: &str, err: reqwest::Error, what: &str) -> ExtractError {
    if err.is_timeout() {
        ExtractError::timeout(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, err)))
    } else {
        ExtractError::fetch(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, err)))
    }
}

/// Fetch a page, bounded by `timeout` for the whole request.
///
/// No retries: callers decide what to do with a failed fetch.
#[tracing::instrument(skip_all, fields(%url))]
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchResult, ExtractError> {
    let parsed_url = url::Url::parse(url).map_err(|e| {
        ExtractError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ExtractError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let response = client
        .get(parsed_url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(url, e, "request failed"))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if !status.is_success() {
        return Err(ExtractError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e, "failed to read body"))?;

    tracing::debug!(status = status.as_u16(), bytes = body.len(), "fetched");

    Ok(FetchResult { content_type, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200)
                .header("content-type", "text/plain; charset=utf-8")
                .body("hello");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/test"), Duration::from_secs(5)).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert_eq!(decode_body(&result.body, result.content_type.as_deref()), "hello");
    }

    #[tokio::test]
    async fn test_fetch_accepts_any_success_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/proxied");
            then.status(203).body("<p>from cache</p>");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/proxied"), Duration::from_secs(5)).await;
        mock.assert();

        let result = result.expect("203 should be accepted");
        assert_eq!(&result.body[..], b"<p>from cache</p>");
    }

    #[tokio::test]
    async fn test_fetch_error_status_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/notfound"), Duration::from_secs(5)).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_fetch_slow_server_is_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .body("late");
        });

        let client = create_test_client();
        let err = fetch(&client, &server.url("/slow"), Duration::from_millis(200))
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let client = create_test_client();
        let err = fetch(&client, "ftp://example.com/a", Duration::from_secs(1))
            .await
            .expect_err("ftp is not fetched");
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_decode_body_uses_charset_hint() {
        let latin1 = b"caf\xe9";
        assert_eq!(
            decode_body(latin1, Some("text/html; charset=ISO-8859-1")),
            "café"
        );
    }

    #[test]
    fn test_decode_body_detects_utf8() {
        let body = "<p>naïve café</p>".as_bytes();
        assert_eq!(decode_body(body, None), "<p>naïve café</p>");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=\"UTF-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
