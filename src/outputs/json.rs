//! JSON output of ranked results.
//!
//! One array per run, ordered by category priority. Keys are snake_case;
//! `img_links` is present only on feed results.

use crate::models::RankedResult;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, stdout};
use tracing::{error, info, instrument};

/// Render results as a pretty-printed JSON array.
pub fn to_json(results: &[RankedResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

/// Write `results` to `path`, or to stdout when no path is given.
///
/// # Errors
///
/// Serialization failures, or I/O errors while creating the parent
/// directory or writing the file.
#[instrument(level = "info", skip_all, fields(count = results.len()))]
pub async fn write_results(
    results: &[RankedResult],
    path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let json = to_json(results)?;

    match path {
        Some(path) => {
            ensure_parent_dir(path).await?;
            if let Err(e) = fs::write(path, &json).await {
                error!(path = %path.display(), error = %e, "Failed to write JSON");
                return Err(e.into());
            }
            info!(path = %path.display(), "Wrote JSON results");
        }
        None => {
            let mut out = stdout();
            out.write_all(json.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
    }
    Ok(())
}
