//! Command-line interface definitions for Good News.
//!
//! One subcommand per harvesting operation. Connection settings are global
//! flags and can also be provided through environment variables.

use crate::extract::ExtractSettings;
use crate::pipeline::{CombinedRequest, DEFAULT_NUM_RESULTS, ScrapeRequest, SearchNewsRequest};
use crate::search::{DEFAULT_SEARCH_ENDPOINT, SearchSettings};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Harvest good-news announcements about a company and summarize them.
///
/// # Examples
///
/// ```sh
/// # Search news for a company, English summaries
/// good_news search-news --query "Acme Robotics" --language en
///
/// # Feed posts of March with bilingual summaries, written to a file
/// good_news -o out/acme.json scrape --linkedin-url https://www.linkedin.com/company/acme --month 3 --language ch
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Optional path to the awful_aj config.yaml file
    #[arg(short, long, env = "GOOD_NEWS_CONFIG", global = true)]
    pub config: Option<String>,

    /// Name of the awful_aj chat template used for summarization
    #[arg(long, env = "GOOD_NEWS_TEMPLATE", default_value = "good_news", global = true)]
    pub template: String,

    /// Write the JSON results to this file instead of stdout
    #[arg(short, long, env = "GOOD_NEWS_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub net: NetArgs,
}

/// HTTP settings shared by all subcommands.
#[derive(Args, Debug)]
pub struct NetArgs {
    /// Search results page endpoint
    #[arg(long, env = "SEARCH_ENDPOINT", default_value = DEFAULT_SEARCH_ENDPOINT, global = true)]
    pub search_endpoint: String,

    /// Timeout for each search page request, in seconds
    #[arg(long, env = "SEARCH_TIMEOUT", default_value_t = 5, global = true)]
    pub search_timeout: u64,

    /// Pause between two search page requests, in seconds
    #[arg(long, env = "SEARCH_SLEEP_INTERVAL", default_value_t = 0, global = true)]
    pub sleep_interval: u64,

    /// Safe-search level sent with every search
    #[arg(long, env = "SEARCH_SAFE", default_value = "active", global = true)]
    pub safe: String,

    /// http:// or https:// proxy for search requests
    #[arg(long, env = "SEARCH_PROXY", global = true)]
    pub proxy: Option<String>,

    /// Timeout for each article request, in seconds
    #[arg(long, env = "EXTRACT_TIMEOUT", default_value_t = 10, global = true)]
    pub extract_timeout: u64,

    /// Redirect hops followed per article
    #[arg(long, env = "MAX_REDIRECTS", default_value_t = 10, global = true)]
    pub max_redirects: usize,

    /// Timeout for the feed page request, in seconds
    #[arg(long, env = "FEED_TIMEOUT", default_value_t = 30, global = true)]
    pub feed_timeout: u64,
}

impl NetArgs {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            endpoint: self.search_endpoint.clone(),
            timeout: Duration::from_secs(self.search_timeout),
            sleep_interval: Duration::from_secs(self.sleep_interval),
            safe: self.safe.clone(),
            proxy: self.proxy.clone(),
        }
    }

    pub fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            timeout: Duration::from_secs(self.extract_timeout),
            max_redirects: self.max_redirects,
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize news search results for a query
    SearchNews {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_NUM_RESULTS)]
        num_results: usize,
        #[arg(long)]
        month: Option<u32>,
        /// Output language: "en", or "ch" for English plus Traditional Chinese
        #[arg(long)]
        language: String,
        /// Interface language passed to the search engine
        #[arg(long)]
        gs_language: Option<String>,
    },
    /// Summarize one month of posts from a company feed
    Scrape {
        #[arg(long)]
        linkedin_url: String,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        language: String,
    },
    /// Run the feed and the news search together
    CombinedSearch {
        #[arg(long)]
        linkedin_url: Option<String>,
        #[arg(long)]
        google_query: Option<String>,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        language: String,
        #[arg(long, default_value_t = DEFAULT_NUM_RESULTS)]
        num_google_results: usize,
        #[arg(long)]
        gs_language: Option<String>,
    },
}

/// A parsed subcommand as a pipeline request.
#[derive(Debug)]
pub enum Request {
    SearchNews(SearchNewsRequest),
    Scrape(ScrapeRequest),
    Combined(CombinedRequest),
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        match command {
            Command::SearchNews {
                query,
                num_results,
                month,
                language,
                gs_language,
            } => Request::SearchNews(SearchNewsRequest {
                query,
                num_results,
                month,
                language,
                gs_language,
            }),
            Command::Scrape {
                linkedin_url,
                month,
                language,
            } => Request::Scrape(ScrapeRequest {
                feed_url: linkedin_url,
                month,
                language,
            }),
            Command::CombinedSearch {
                linkedin_url,
                google_query,
                month,
                language,
                num_google_results,
                gs_language,
            } => Request::Combined(CombinedRequest {
                feed_url: linkedin_url,
                query: google_query,
                month,
                language,
                num_results: num_google_results,
                gs_language,
            }),
        }
    }
}
