//! Turning raw post or article text into a structured [`Summary`].
//!
//! The model is asked for bare JSON but routinely wraps it in Markdown
//! fences or gets cut off. Fences are stripped; a truncated answer is
//! re-asked once; anything that still does not parse becomes a fallback
//! summary with category `None` so the batch keeps its shape.

use crate::api::AskAsync;
use crate::models::{Language, Origin, Summary};
use crate::prompts::prepare_prompt;
use crate::utils::{looks_truncated, truncate_for_log};
use tracing::{debug, instrument, warn};

pub const PARSE_FAILURE_HEADLINE: &str = "Error parsing response";

impl Summary {
    /// Placeholder used when the model's answer is unusable.
    pub fn fallback(contents: impl Into<String>) -> Self {
        Self {
            headline: PARSE_FAILURE_HEADLINE.to_string(),
            content: contents.into(),
            category: "None".to_string(),
            ..Self::default()
        }
    }
}

/// Remove Markdown code fences around a JSON answer.
pub fn strip_code_fences(response: &str) -> String {
    response.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a model answer, falling back to [`Summary::fallback`] on bad JSON.
pub fn parse_summary(response: &str) -> Summary {
    try_parse_summary(response).unwrap_or_else(|e| {
        warn!(
            error = %e,
            response_preview = %truncate_for_log(response, 300),
            "Model returned non-conforming JSON"
        );
        Summary::fallback(response)
    })
}

fn try_parse_summary(response: &str) -> Result<Summary, serde_json::Error> {
    serde_json::from_str::<Summary>(&strip_code_fences(response))
}

/// Summarizes text through any [`AskAsync`] client.
#[derive(Debug)]
pub struct Summarizer<A> {
    asker: A,
}

impl<A> Summarizer<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(asker: A) -> Self {
        Self { asker }
    }

    /// Summarize one text. Never fails: transport and parse problems come
    /// back as a fallback summary classified `None`.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn summarize(&self, text: &str, language: Language, origin: Origin) -> Summary {
        let prompt = prepare_prompt(text, language, origin);

        let response = match self.asker.ask(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Summarization call failed");
                return Summary::fallback(format!("Summarization failed: {e}"));
            }
        };

        let summary = match try_parse_summary(&response) {
            Ok(summary) => summary,
            Err(e) if looks_truncated(&e) => {
                warn!(error = %e, "EOF while parsing; re-asking once");
                match self.asker.ask(&prompt).await {
                    Ok(second) => parse_summary(&second),
                    Err(e2) => {
                        warn!(error = %e2, "Re-ask failed");
                        parse_summary(&response)
                    }
                }
            }
            Err(_) => parse_summary(&response),
        };
        debug!(category = %summary.category, "Summarized");
        summary
    }
}
