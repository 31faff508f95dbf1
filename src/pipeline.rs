//! The three harvesting operations.
//!
//! Each operation validates its input, gathers posts from one or more
//! [`ContentSource`]s, summarizes them concurrently and ranks the result.
//! Clients live in an [`AppContext`] built once at start-up.

use crate::api::AskAsync;
use crate::error::NewsError;
use crate::extract::{ExtractSettings, Extractor};
use crate::fanout::summarize_all;
use crate::models::{Language, RankedResult, SearchQuery};
use crate::rank::{rank, sort_by_priority};
use crate::search::{Paginator, SearchSettings};
use crate::sources::{ContentSource, FeedScraper, FeedSource, WebSearchSource};
use crate::summarize::Summarizer;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_NUM_RESULTS: usize = 10;

/// HTTP clients shared by every operation of a run.
#[derive(Debug)]
pub struct AppContext {
    pub paginator: Paginator,
    pub extractor: Extractor,
    pub feed: FeedScraper,
}

impl AppContext {
    pub fn new(
        search: SearchSettings,
        extract: ExtractSettings,
        feed_timeout: Duration,
    ) -> Result<Self, NewsError> {
        Ok(Self {
            paginator: Paginator::new(search)?,
            extractor: Extractor::new(extract)?,
            feed: FeedScraper::new(feed_timeout)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SearchNewsRequest {
    pub query: String,
    pub num_results: usize,
    pub month: Option<u32>,
    pub language: String,
    /// Interface language passed to the search endpoint.
    pub gs_language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub feed_url: String,
    pub month: u32,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct CombinedRequest {
    pub feed_url: Option<String>,
    pub query: Option<String>,
    pub month: u32,
    pub language: String,
    pub num_results: usize,
    pub gs_language: Option<String>,
}

/// Collect, summarize and rank the posts of one source.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
async fn run_source<S, A>(
    source: &S,
    summarizer: &Summarizer<A>,
    language: Language,
) -> Result<Vec<RankedResult>, NewsError>
where
    S: ContentSource,
    A: AskAsync<Response = String>,
{
    let posts = source.collect().await?;
    info!(count = posts.len(), "Posts collected");
    let summarized = summarize_all(summarizer, posts, language).await;
    rank(summarized)
}

fn web_source<'a>(
    ctx: &'a AppContext,
    term: String,
    num_results: usize,
    month: Option<u32>,
    gs_language: Option<String>,
) -> WebSearchSource<'a> {
    let mut query = SearchQuery::new(term, num_results);
    query.month_filter = month;
    query.language_hint = gs_language;
    query.dedupe = true;
    WebSearchSource::new(&ctx.paginator, &ctx.extractor, query)
}

/// News search results for a query, summarized and ranked.
///
/// # Errors
///
/// Bad language or month, and unknown categories in the model's answers.
#[instrument(level = "info", skip_all, fields(query = %req.query))]
pub async fn search_news<A>(
    ctx: &AppContext,
    summarizer: &Summarizer<A>,
    req: SearchNewsRequest,
) -> Result<Vec<RankedResult>, NewsError>
where
    A: AskAsync<Response = String>,
{
    let language: Language = req.language.parse()?;
    let source = web_source(ctx, req.query, req.num_results, req.month, req.gs_language);
    run_source(&source, summarizer, language).await
}

/// Feed posts of one month, summarized and ranked with their media links.
///
/// # Errors
///
/// Bad language, month or URL, feed fetch failures, and unknown categories.
#[instrument(level = "info", skip_all, fields(feed_url = %req.feed_url, month = req.month))]
pub async fn scrape<A>(
    ctx: &AppContext,
    summarizer: &Summarizer<A>,
    req: ScrapeRequest,
) -> Result<Vec<RankedResult>, NewsError>
where
    A: AskAsync<Response = String>,
{
    let language: Language = req.language.parse()?;
    let source = FeedSource::new(&ctx.feed, &req.feed_url, req.month)?;
    run_source(&source, summarizer, language).await
}

/// Both pipelines at once, feed results first, ranked as one list.
///
/// Either input may be absent; with neither, the result is empty.
///
/// # Errors
///
/// The first failure of either pipeline.
#[instrument(level = "info", skip_all, fields(month = req.month))]
pub async fn combined_search<A>(
    ctx: &AppContext,
    summarizer: &Summarizer<A>,
    req: CombinedRequest,
) -> Result<Vec<RankedResult>, NewsError>
where
    A: AskAsync<Response = String>,
{
    let language: Language = req.language.parse()?;

    let feed_source = req
        .feed_url
        .as_deref()
        .map(|url| FeedSource::new(&ctx.feed, url, req.month))
        .transpose()?;
    let search_source = req.query.map(|term| {
        web_source(ctx, term, req.num_results, Some(req.month), req.gs_language)
    });

    let feed_run = async {
        match &feed_source {
            Some(source) => run_source(source, summarizer, language).await,
            None => Ok(Vec::new()),
        }
    };
    let web_run = async {
        match &search_source {
            Some(source) => run_source(source, summarizer, language).await,
            None => Ok(Vec::new()),
        }
    };
    let (feed_results, web_results) = futures::join!(feed_run, web_run);

    let mut results = feed_results?;
    results.extend(web_results?);
    sort_by_priority(&mut results);
    info!(count = results.len(), "Combined results ranked");
    Ok(results)
}
