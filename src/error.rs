//! Typed errors for the harvesting pipeline.
//!
//! Only conditions that must reach the caller live here: bad input that is
//! rejected before any network traffic, and contract violations between
//! stages (an LLM answer carrying a category the ranker does not know).
//! Transport failures inside a single page fetch or article fetch are
//! degraded locally and never become a `NewsError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("invalid month {0}: expected a value between 1 and 12")]
    InvalidMonth(u32),

    #[error("unsupported language \"{0}\": expected \"ch\" or \"en\"")]
    UnsupportedLanguage(String),

    #[error("unknown category \"{0}\" cannot be ranked")]
    UnknownCategory(String),

    #[error("invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
