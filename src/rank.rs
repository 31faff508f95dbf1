//! Final ordering of summarized results by category priority.
//!
//! The category label comes straight from the model. Labels outside the
//! fixed table are treated as a broken contract with the summarizer and
//! fail the whole ranking instead of being quietly demoted.

use crate::error::NewsError;
use crate::models::{Category, RankedResult, Summarized};
use tracing::{debug, instrument};

/// Assemble a [`RankedResult`] from a summarized post.
///
/// # Errors
///
/// [`NewsError::UnknownCategory`] when the summary's label is not one of
/// the six known categories.
pub fn to_ranked(item: Summarized) -> Result<RankedResult, NewsError> {
    let category: Category = item.summary.category.parse()?;
    Ok(RankedResult {
        crawled_text: item.post.text,
        headline: item.summary.headline,
        contents: item.summary.content,
        headline_localized: item.summary.headline_zh_tw,
        contents_localized: item.summary.content_zh_tw,
        category,
        source_url: item.post.url,
        media_links: item.post.media_links,
    })
}

/// Stable-sort results by category priority (Fund-raised first, None last).
pub fn sort_by_priority(results: &mut [RankedResult]) {
    results.sort_by_key(|r| r.category.priority());
}

/// Convert and order a batch of summarized posts.
///
/// # Errors
///
/// Fails on the first item carrying an unknown category label.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub fn rank(items: Vec<Summarized>) -> Result<Vec<RankedResult>, NewsError> {
    let mut results = items
        .into_iter()
        .map(to_ranked)
        .collect::<Result<Vec<_>, _>>()?;
    sort_by_priority(&mut results);
    debug!(
        order = ?results.iter().map(|r| r.category.label()).collect::<Vec<_>>(),
        "Ranked results"
    );
    Ok(results)
}
