//! Run summary artifact and CI output signal.
//!
//! `summary.json` is overwritten every run; it describes one
//! invocation, not a history. The GitHub Actions step-output lines are
//! the machine-readable notification signal: the workflow opens an
//! issue when `has_updates=true`.

use crate::error::ScrapeError;
use crate::models::RunSummary;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Write `summary.json` into the output directory, overwriting any
/// previous run's summary.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_summary(
    summary: &RunSummary,
    output_dir: &Path,
) -> Result<PathBuf, ScrapeError> {
    let path = output_dir.join("summary.json");
    let json = serde_json::to_string_pretty(summary).map_err(|e| ScrapeError::SerializeState {
        path: path.clone(),
        source: e,
    })?;

    fs::write(&path, json).await.map_err(|e| ScrapeError::Io {
        path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), total_new = summary.total_new_updates, "Wrote run summary");
    Ok(path)
}

/// The step-output lines consumed by the workflow.
pub fn actions_output_lines(summary: &RunSummary) -> String {
    format!(
        "new_updates={}\nhas_updates={}\n",
        summary.total_new_updates,
        summary.has_updates()
    )
}

/// Append the step-output lines to the given `GITHUB_OUTPUT` file.
pub async fn append_actions_output(
    summary: &RunSummary,
    output_path: &Path,
) -> Result<(), ScrapeError> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)
        .await
        .map_err(|e| ScrapeError::Io {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    file.write_all(actions_output_lines(summary).as_bytes())
        .await
        .map_err(|e| ScrapeError::Io {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    info!(path = %output_path.display(), "Appended GitHub Actions outputs");
    Ok(())
}

/// Emit the CI signal when running under GitHub Actions; a no-op
/// everywhere else.
pub async fn write_actions_output(summary: &RunSummary) -> Result<(), ScrapeError> {
    if std::env::var_os("GITHUB_ACTIONS").is_none() {
        return Ok(());
    }
    let Some(path) = std::env::var_os("GITHUB_OUTPUT") else {
        return Ok(());
    };
    append_actions_output(summary, Path::new(&path)).await
}
