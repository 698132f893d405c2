// ABOUTME: Extractor ties the fetch collaborator to the pipeline under the per-call extraction deadline.
// ABOUTME: Holds a shared reqwest client and an Arc'd read-only ExtractionConfig; cheap to clone across tasks.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::deadline::within_deadline;
use crate::error::ExtractError;
use crate::options::{ExtractionConfig, ExtractorBuilder};
use crate::pipeline::{extract_with_token, file_placeholder};
use crate::resource::fetch;
use crate::urls::{is_valid_url, is_web_page_url};

/// Fetches article pages and extracts their main content.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: Arc<ExtractionConfig>,
    http_client: reqwest::Client,
}

impl Extractor {
    /// Create a new ExtractorBuilder for configuring the extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create an Extractor over `config`, building a client when none is given.
    pub fn new(config: Arc<ExtractionConfig>, http_client: Option<reqwest::Client>) -> Self {
        let http_client = http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&config.user_agent)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The shared client, for collaborators that fetch feeds or APIs with the same settings.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Fetch `url` and extract its article fragment.
    ///
    /// Links to downloads return the file placeholder without any request.
    /// The fetch is bounded by the request timeout, the extraction by the
    /// extraction timeout; the two budgets are independent.
    #[instrument(skip_all, fields(%url))]
    pub async fn fetch_and_extract(&self, url: &str) -> Result<String, ExtractError> {
        if !is_web_page_url(url) {
            debug!("file link, skipping fetch");
            return Ok(file_placeholder(url));
        }
        if !is_valid_url(url) {
            return Err(ExtractError::invalid_url(
                url,
                "Fetch",
                Some(anyhow::anyhow!("missing scheme or host")),
            ));
        }

        let fetched = fetch(&self.http_client, url, self.config.request_timeout).await?;
        self.run_pipeline(url, fetched.body.to_vec(), fetched.content_type)
            .await
    }

    /// Extract from HTML already in hand, under the extraction deadline.
    pub async fn extract_html(&self, url: &str, html: Vec<u8>) -> Result<String, ExtractError> {
        self.run_pipeline(url, html, None).await
    }

    async fn run_pipeline(
        &self,
        url: &str,
        html: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, ExtractError> {
        let config = Arc::clone(&self.config);
        let owned_url = url.to_string();
        within_deadline(self.config.extraction_timeout, move |token| {
            extract_with_token(&owned_url, &html, content_type.as_deref(), &config, &token)
        })
        .await
        .map_err(|e| ExtractError::from_timeout(url, "Extract", e))?
    }
}
