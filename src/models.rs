//! Data models flowing through the harvesting pipeline.
//!
//! Records are plain values owned by the stage that produced them:
//! - [`SearchQuery`] / [`SearchResult`] / [`SearchHit`]: paginator input and output
//! - [`FetchOutcome`]: what the content extractor made of one URL
//! - [`Post`]: the common shape every content source hands to summarization
//! - [`Summary`]: the structured answer parsed out of the LLM response
//! - [`RankedResult`]: the final, ordered record returned to the caller
//!
//! `Summary` uses the key names requested in the prompt (`Headline`,
//! `Content-zh-tw`, ...) while `RankedResult` serializes with the snake_case
//! names consumers of the output already rely on.

use crate::error::NewsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameters of one search session.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The search terms.
    pub term: String,
    /// Upper bound on the number of results yielded.
    pub desired_count: usize,
    /// Interface language of the search engine (`hl`).
    pub language_hint: Option<String>,
    /// Country bias of the search engine (`gl`).
    pub region_hint: Option<String>,
    /// Restrict results to this month of the current year.
    pub month_filter: Option<u32>,
    /// Offset of the first requested result.
    pub start_offset: usize,
    /// Drop results whose URL was already yielded in this session.
    pub dedupe: bool,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, desired_count: usize) -> Self {
        Self {
            term: term.into(),
            desired_count,
            language_hint: None,
            region_hint: None,
            month_filter: None,
            start_offset: 0,
            dedupe: false,
        }
    }
}

/// A single news result scraped from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub description: String,
}

/// How much of each result the paginator should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Urls,
    Full,
}

/// One item of the paginator's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHit {
    Url(String),
    Result(SearchResult),
}

impl SearchHit {
    pub fn url(&self) -> &str {
        match self {
            SearchHit::Url(url) => url,
            SearchHit::Result(result) => &result.url,
        }
    }
}

/// Why an extraction produced the text it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    HttpError(u16),
    RedirectExhausted,
    ExtractionEmpty,
    NetworkError,
}

/// Result of running the content extractor on one URL.
///
/// `extracted_text` always holds something: either article text or a
/// diagnostic string that still goes on to summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source_url: String,
    /// Final URL after redirects, when a response was received.
    pub resolved_url: Option<String>,
    pub extracted_text: String,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// Where a [`Post`] came from; selects the prompt used to summarize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Feed,
    WebSearch,
}

/// Raw text plus provenance, as produced by any [`ContentSource`](crate::sources::ContentSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub origin: Origin,
    pub url: String,
    pub text: String,
    pub media_links: Option<Vec<String>>,
}

/// The structured answer requested from the model.
///
/// Every field defaults to empty so that a partial answer still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "Headline", default)]
    pub headline: String,
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "Headline-zh-tw", default)]
    pub headline_zh_tw: String,
    #[serde(rename = "Content-zh-tw", default)]
    pub content_zh_tw: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

/// A post paired with its summary, before ranking.
#[derive(Debug, Clone)]
pub struct Summarized {
    pub post: Post,
    pub summary: Summary,
}

/// The fixed set of good-news categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fund-raised")]
    FundRaised,
    #[serde(rename = "Business Collaboration")]
    BusinessCollaboration,
    #[serde(rename = "Product-launched")]
    ProductLaunched,
    Awards,
    Activities,
    None,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::FundRaised,
        Category::BusinessCollaboration,
        Category::ProductLaunched,
        Category::Awards,
        Category::Activities,
        Category::None,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::FundRaised => "Fund-raised",
            Category::BusinessCollaboration => "Business Collaboration",
            Category::ProductLaunched => "Product-launched",
            Category::Awards => "Awards",
            Category::Activities => "Activities",
            Category::None => "None",
        }
    }

    /// Sort key used by the ranker; lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            Category::FundRaised => 0,
            Category::BusinessCollaboration => 1,
            Category::ProductLaunched => 2,
            Category::Awards => 3,
            Category::Activities => 4,
            Category::None => 5,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| NewsError::UnknownCategory(s.to_string()))
    }
}

/// Output language of the summaries.
///
/// `En` asks for English fields only; `Ch` additionally asks for
/// Traditional Chinese headline and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ch,
    En,
}

impl FromStr for Language {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ch" => Ok(Language::Ch),
            "en" => Ok(Language::En),
            other => Err(NewsError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// A fully summarized and categorized announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    pub crawled_text: String,
    pub headline: String,
    pub contents: String,
    #[serde(rename = "headline_zh_tw")]
    pub headline_localized: String,
    #[serde(rename = "contents_zh_tw")]
    pub contents_localized: String,
    pub category: Category,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "img_links", skip_serializing_if = "Option::is_none", default)]
    pub media_links: Option<Vec<String>>,
}
