//! Origins of raw text to summarize.
//!
//! Each origin turns untyped external data into a list of [`Post`]s; the
//! rest of the pipeline never needs to know where a post came from.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | News search | [`web`] | Paginated search results, then article extraction per URL |
//! | Company feed | [`feed`] | Post cards scraped from a public feed page, filtered by month |

pub mod feed;
pub mod web;

pub use feed::{FeedScraper, FeedSource};
pub use web::WebSearchSource;

use crate::error::NewsError;
use crate::models::Post;

/// Anything that can produce posts for summarization.
pub trait ContentSource {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Gather every post this source has to offer.
    async fn collect(&self) -> Result<Vec<Post>, NewsError>;
}
