// ABOUTME: Main library entry point for the morning-extract article extraction core.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, ExtractionConfig, extract, deadlines and URL checks.

//! Morning Extract - recovers the main article body from arbitrary web pages.
//!
//! The pipeline tries, in order, an optional density-scoring pass, a
//! site-specific selector, a list of generic selectors, and finally salvages
//! the first paragraphs of the page. Whatever it finds is cleaned and capped
//! in length. Every call runs under its own deadline.
//!
//! # Example
//!
//! ```no_run
//! use morning_extract::{Extractor, ExtractError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExtractError> {
//!     let extractor = Extractor::builder().include_images(true).build();
//!     let fragment = extractor.fetch_and_extract("https://example.com/article").await?;
//!     println!("{}", fragment);
//!     Ok(())
//! }
//! ```

pub mod deadline;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod formats;
pub mod options;
pub mod pipeline;
pub mod resource;
pub mod urls;

pub use crate::deadline::{run_with_deadline, run_with_token, within_deadline, CancelToken, TimeoutError};
pub use crate::dom::cleanup::TRUNCATION_MARKER;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractor::Extractor;
pub use crate::options::{ExtractionConfig, ExtractorBuilder, OutputFormat, SiteSelectors};
pub use crate::pipeline::{extract, extract_with_deadline, file_placeholder};
pub use crate::urls::{is_valid_url, is_web_page_url};
