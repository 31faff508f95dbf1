//! Main-text extraction from arbitrary article pages.
//!
//! Nothing is known about the structure of the pages we land on, so the
//! extractor works through a fixed chain of container rules, most specific
//! first, and keeps the paragraphs of the first container found. Short
//! paragraphs are dropped as navigation, bylines or ad fragments.
//!
//! [`Extractor::scrape`] never fails: every failure mode is folded into the
//! returned [`FetchOutcome`] as a diagnostic string, because the text is
//! still handed to the summarizer, which classifies junk as `None`.
//!
//! # Diagnostics
//!
//! | Cause | `extracted_text` prefix | Status |
//! |-------|-------------------------|--------|
//! | 4xx / 5xx | `HTTP error:` | `HttpError(code)` |
//! | unfollowable or endless redirects | `HTTP error:` | `RedirectExhausted` |
//! | network, timeout, body decoding | `Error scraping content:` | `NetworkError` |
//! | no qualifying paragraph | [`EXTRACTION_SENTINEL`] | `ExtractionEmpty` |

use crate::error::NewsError;
use crate::models::{FetchOutcome, FetchStatus};
use crate::useragent::browser_headers;
use once_cell::sync::Lazy;
use reqwest::{Client, redirect::Policy};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Returned in place of content when nothing usable was found.
pub const EXTRACTION_SENTINEL: &str = "Could not extract content from the page.";

/// Paragraphs must be strictly longer than this (in characters) to count.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// One link of the container fallback chain.
struct ContentRule {
    name: &'static str,
    selector: Selector,
}

impl ContentRule {
    fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).next()
    }
}

const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".story-body",
    "#article-body",
    ".article-body",
    ".article__body",
    ".article-text",
    "main",
    ".content",
    "body",
];

static CONTENT_RULES: Lazy<Vec<ContentRule>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|&name| ContentRule {
            name,
            selector: Selector::parse(name).expect("valid content selector"),
        })
        .collect()
});

static NON_CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, nav, footer, header").expect("valid non-content selector")
});

static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// Remove elements that never hold article text.
fn strip_non_content(document: &mut Html) {
    let ids: Vec<_> = document.select(&NON_CONTENT).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Extract the main text of an HTML document.
///
/// Returns `None` when no container matched or the chosen container has no
/// paragraph longer than [`MIN_PARAGRAPH_CHARS`].
pub fn extract_main_text(html: &str) -> Option<String> {
    let mut document = Html::parse_document(html);
    strip_non_content(&mut document);

    let (rule, container) = CONTENT_RULES
        .iter()
        .find_map(|rule| rule.find(&document).map(|el| (rule.name, el)))?;
    debug!(rule, "Selected content container");

    let paragraphs: Vec<String> = container
        .select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}

/// Settings for article fetching.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Timeout applied to each article request.
    pub timeout: Duration,
    /// Maximum number of redirect hops followed automatically.
    pub max_redirects: usize,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 10,
        }
    }
}

/// Fetches article pages and reduces them to their main text.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
    settings: ExtractSettings,
}

impl Extractor {
    pub fn new(settings: ExtractSettings) -> Result<Self, NewsError> {
        let client = Client::builder()
            .redirect(Policy::limited(settings.max_redirects))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Scrape `url` with the configured timeout.
    pub async fn scrape(&self, url: &str) -> FetchOutcome {
        self.scrape_with_timeout(url, self.settings.timeout).await
    }

    /// Scrape `url`, giving up after `timeout`.
    #[instrument(level = "info", skip(self), fields(%url))]
    pub async fn scrape_with_timeout(&self, url: &str, timeout: Duration) -> FetchOutcome {
        let response = match self
            .client
            .get(url)
            .headers(browser_headers())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return request_failure(url, None, &e),
        };

        let final_url = response.url().to_string();
        if final_url != url {
            info!(from = %url, to = %final_url, "Followed redirect");
        }

        let status = response.status();
        if status.is_redirection() {
            warn!(%status, "Redirect response without a usable Location");
            return FetchOutcome {
                source_url: url.to_string(),
                resolved_url: Some(final_url.clone()),
                extracted_text: format!(
                    "HTTP error: {status} redirect from {final_url} could not be followed"
                ),
                status: FetchStatus::RedirectExhausted,
            };
        }
        if status.is_client_error() || status.is_server_error() {
            warn!(%status, "Article request rejected");
            return FetchOutcome {
                source_url: url.to_string(),
                resolved_url: Some(final_url.clone()),
                extracted_text: format!("HTTP error: {status} for url ({final_url})"),
                status: FetchStatus::HttpError(status.as_u16()),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return request_failure(url, Some(final_url), &e),
        };

        match extract_main_text(&body) {
            Some(text) => {
                info!(chars = text.chars().count(), "Extracted article text");
                FetchOutcome {
                    source_url: url.to_string(),
                    resolved_url: Some(final_url),
                    extracted_text: text,
                    status: FetchStatus::Ok,
                }
            }
            None => {
                warn!("Could not extract content from the page");
                FetchOutcome {
                    source_url: url.to_string(),
                    resolved_url: Some(final_url),
                    extracted_text: EXTRACTION_SENTINEL.to_string(),
                    status: FetchStatus::ExtractionEmpty,
                }
            }
        }
    }
}

fn request_failure(url: &str, resolved_url: Option<String>, e: &reqwest::Error) -> FetchOutcome {
    let (extracted_text, status) = if e.is_redirect() {
        (format!("HTTP error: {e}"), FetchStatus::RedirectExhausted)
    } else if let Some(code) = e.status() {
        (format!("HTTP error: {e}"), FetchStatus::HttpError(code.as_u16()))
    } else {
        (format!("Error scraping content: {e}"), FetchStatus::NetworkError)
    };
    warn!(%url, error = %e, "Article fetch failed");
    FetchOutcome {
        source_url: url.to_string(),
        resolved_url,
        extracted_text,
        status,
    }
}
