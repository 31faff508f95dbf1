//! Concurrent, order-preserving dispatch of per-item work.
//!
//! Every stage of the pipeline (article extraction, summarization) launches
//! one future per input item, all at once, and waits for all of them.
//! Output slot `i` always belongs to input `i`, whatever order the futures
//! finish in. Stages never fail per item: failures are values (diagnostic
//! strings, fallback summaries), so one bad item cannot sink the batch.

use crate::api::AskAsync;
use crate::extract::Extractor;
use crate::models::{FetchOutcome, Language, Post, Summarized};
use crate::summarize::Summarizer;
use futures::future::join_all;
use std::future::Future;
use tracing::{info, instrument};

/// Run `task` over every item concurrently and return the outputs in input order.
pub async fn fan_out<I, F, Fut>(items: I, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    join_all(items.into_iter().map(task)).await
}

/// Extract article text from every URL concurrently.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn extract_all(extractor: &Extractor, urls: &[String]) -> Vec<FetchOutcome> {
    let outcomes = fan_out(urls, |url| extractor.scrape(url)).await;

    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    info!(total = outcomes.len(), ok, failed = outcomes.len() - ok, "Extraction stage complete");
    outcomes
}

/// Summarize every post concurrently, pairing each post with its summary.
#[instrument(level = "info", skip_all, fields(count = posts.len()))]
pub async fn summarize_all<A>(
    summarizer: &Summarizer<A>,
    posts: Vec<Post>,
    language: Language,
) -> Vec<Summarized>
where
    A: AskAsync<Response = String>,
{
    let summaries = fan_out(&posts, |post| {
        summarizer.summarize(&post.text, language, post.origin)
    })
    .await;

    info!(count = summaries.len(), "Summarization stage complete");
    posts
        .into_iter()
        .zip(summaries)
        .map(|(post, summary)| Summarized { post, summary })
        .collect()
}
