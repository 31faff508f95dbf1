//! # Good News
//!
//! Harvests "good news" about a company (funding rounds, partnerships,
//! product launches, awards, events) from two origins, summarizes every
//! item through an OpenAI-compatible LLM and prints the results ranked by
//! category.
//!
//! ## Usage
//!
//! ```sh
//! good_news search-news --query "Acme Robotics" --month 3 --language en
//! good_news scrape --linkedin-url https://www.linkedin.com/company/acme --month 3 --language ch
//! good_news -o out.json combined-search --linkedin-url <url> --google-query acme --month 3 --language ch
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: news search pages are paginated and every hit's article
//!    is fetched concurrently; feed pages are scraped for posts of the month
//! 2. **Summarizing**: every post goes to the LLM concurrently, results keep
//!    their input order
//! 3. **Ranking**: results are stably sorted by category priority
//! 4. **Output**: a JSON array on stdout or in `--output`

use awful_aj::{config, config_dir, template};
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod error;
mod extract;
mod fanout;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod rank;
mod search;
mod sources;
mod summarize;
mod useragent;
mod utils;

use api::backoff_client;
use cli::{Cli, Request};
use outputs::json;
use pipeline::AppContext;
use summarize::Summarizer;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr, stdout is for results) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("good_news starting up");

    let args = Cli::parse();
    debug!(?args.command, ?args.output, "Parsed CLI arguments");

    // ---- Load template & config ----
    let template = template::load_template(&args.template).await?;
    info!(template = %args.template, "Loaded template");
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config_dir()?.join("config.yaml").to_string_lossy().into_owned(),
    };
    let config = config::load_config(&config_path)?;
    info!(%config_path, "Loaded configuration");

    let ctx = AppContext::new(
        args.net.search_settings(),
        args.net.extract_settings(),
        args.net.feed_timeout(),
    )?;
    let summarizer = Summarizer::new(backoff_client(&config, &template));

    let outcome = match Request::from(args.command) {
        Request::SearchNews(req) => pipeline::search_news(&ctx, &summarizer, req).await,
        Request::Scrape(req) => pipeline::scrape(&ctx, &summarizer, req).await,
        Request::Combined(req) => pipeline::combined_search(&ctx, &summarizer, req).await,
    };
    let results = match outcome {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "Operation failed");
            return Err(e.into());
        }
    };

    json::write_results(&results, args.output.as_deref()).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        results = results.len(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
