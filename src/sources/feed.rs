//! Posts from a company's public social feed page.
//!
//! The public feed renders each post as a card with a permalink. Post ids
//! embedded in those permalinks are time-ordered: the upper 41 bits of the
//! 19-digit id are the creation time in Unix milliseconds, which is how
//! posts are filtered to the requested month without any date markup.

use super::ContentSource;
use crate::error::NewsError;
use crate::models::{Origin, Post};
use crate::useragent::browser_headers;
use chrono::{DateTime, Datelike, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;
use tracing::{debug, info, instrument};

static POST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{19})").expect("valid post id regex"));

static POST_CARD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[data-id="entire-feed-card-link"]"#).expect("valid card selector")
});
static PERMALINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[data-id="main-feed-card__full-link"]"#).expect("valid permalink selector")
});
static IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("valid image selector"));

/// Number of leading bits of a post id that encode its timestamp.
const TIMESTAMP_BITS: u32 = 41;

/// The 19-digit post id inside a permalink, if any.
pub fn post_id(url: &str) -> Option<u64> {
    POST_ID.captures(url)?.get(1)?.as_str().parse().ok()
}

/// Unix milliseconds encoded in the leading 41 bits of a post id.
pub fn post_timestamp_millis(id: u64) -> u64 {
    let bits = u64::BITS - id.leading_zeros();
    if bits <= TIMESTAMP_BITS {
        id
    } else {
        id >> (bits - TIMESTAMP_BITS)
    }
}

/// Creation time of the post behind `url`, decoded from its id.
pub fn post_date(url: &str) -> Option<DateTime<Utc>> {
    let millis = i64::try_from(post_timestamp_millis(post_id(url)?)).ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn posted_in(url: &str, month: u32, year: i32) -> bool {
    post_date(url).is_some_and(|d| d.month() == month && d.year() == year)
}

fn card_text(card: ElementRef<'_>) -> String {
    card.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join("\n")
}

/// Extract the posts of `month`/`year` from a feed page.
///
/// Cards without a permalink, or whose permalink carries no decodable id,
/// are skipped.
pub fn parse_feed(html: &str, month: u32, year: i32) -> Vec<Post> {
    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    for card in document.select(&POST_CARD) {
        let url = card
            .select(&PERMALINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();
        if !posted_in(url, month, year) {
            debug!(%url, "Skipping post outside the requested month");
            continue;
        }

        let media_links: Vec<String> = card
            .select(&IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .unique()
            .collect();

        posts.push(Post {
            origin: Origin::Feed,
            url: url.to_string(),
            text: card_text(card),
            media_links: Some(media_links),
        });
    }
    posts
}

/// Shared HTTP client for feed pages.
#[derive(Debug, Clone)]
pub struct FeedScraper {
    client: Client,
}

impl FeedScraper {
    pub fn new(timeout: Duration) -> Result<Self, NewsError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Fetch a feed page and keep the posts of `month` in `year`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx statuses.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_posts(
        &self,
        feed_url: &Url,
        month: u32,
        year: i32,
    ) -> Result<Vec<Post>, NewsError> {
        let body = self
            .client
            .get(feed_url.clone())
            .headers(browser_headers())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let posts = parse_feed(&body, month, year);
        info!(count = posts.len(), "Collected feed posts");
        Ok(posts)
    }
}

/// Feed posts of one month of the current year.
#[derive(Debug)]
pub struct FeedSource<'a> {
    scraper: &'a FeedScraper,
    feed_url: Url,
    month: u32,
}

impl<'a> FeedSource<'a> {
    /// # Errors
    ///
    /// [`NewsError::InvalidMonth`] unless `month` is in `1..=12`, and
    /// [`NewsError::InvalidUrl`] when `feed_url` is not an absolute URL.
    pub fn new(scraper: &'a FeedScraper, feed_url: &str, month: u32) -> Result<Self, NewsError> {
        if !(1..=12).contains(&month) {
            return Err(NewsError::InvalidMonth(month));
        }
        Ok(Self {
            scraper,
            feed_url: Url::parse(feed_url.trim())?,
            month,
        })
    }
}

impl ContentSource for FeedSource<'_> {
    fn name(&self) -> &'static str {
        "feed"
    }

    async fn collect(&self) -> Result<Vec<Post>, NewsError> {
        self.scraper
            .fetch_posts(&self.feed_url, self.month, Utc::now().year())
            .await
    }
}
