//! Per-source run orchestration.
//!
//! One call to [`run_source`] takes a source through the whole pipeline:
//! advisory lock → load prior state → extract → normalize → reconcile →
//! persist. Every failure mode is converted into the returned
//! [`SourceRunResult`]; nothing propagates as `Err`, so the aggregator
//! can run sources independently.
//!
//! Fail-safe ordering matters: extraction happens before any write, so a
//! dead site or a mangled response can never corrupt the history on
//! disk. A save failure discards the in-memory update; the next run
//! simply rediscovers the same records.

use crate::dedup::reconcile;
use crate::error::ScrapeError;
use crate::models::SourceRunResult;
use crate::normalize::normalize;
use crate::sources::UpdateSource;
use crate::store::{self, StoreLock};
use crate::utils::truncate_for_log;
use chrono::Local;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Run a single source end-to-end and report the outcome.
///
/// On success the source's state artifact is rewritten and
/// `last_checked` advances; on any failure the artifact is left exactly
/// as it was.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
pub async fn run_source(
    source: &dyn UpdateSource,
    output_dir: &Path,
    timeout: Duration,
) -> SourceRunResult {
    info!(url = source.url(), "Checking source");

    match run_source_inner(source, output_dir, timeout).await {
        Ok((new_count, total_count)) => {
            info!(new_count, total_count, "Source check complete");
            SourceRunResult {
                source: source.name().to_string(),
                success: true,
                new_count,
                total_count,
                error: None,
            }
        }
        Err(e) => {
            error!(error = %e, "Source check failed");
            SourceRunResult::failed(source.name(), e)
        }
    }
}

async fn run_source_inner(
    source: &dyn UpdateSource,
    output_dir: &Path,
    timeout: Duration,
) -> Result<(usize, usize), ScrapeError> {
    let state_path = output_dir.join(source.output_file());
    let _lock = StoreLock::acquire(&state_path)?;

    let state = store::load(&state_path, source.url(), source.name()).await?;

    let raw = source.fetch_candidates(timeout).await?;
    if raw.is_empty() {
        return Err(ScrapeError::NoUpdates(source.name().to_string()));
    }

    let base = Url::parse(source.url()).map_err(|e| {
        ScrapeError::InvalidRecord(format!("source url {:?} is not a valid base: {e}", source.url()))
    })?;
    let today = Local::now().date_naive();

    let mut fresh = Vec::with_capacity(raw.len());
    for candidate in raw {
        let preview = truncate_for_log(&candidate.title, 120);
        match normalize(candidate, &base, today) {
            Ok(record) => fresh.push(record),
            Err(e) => {
                warn!(title = %preview, error = %e, "Skipping invalid candidate");
            }
        }
    }

    let (state, new_records) = reconcile(state, fresh);
    for record in &new_records {
        info!(title = %truncate_for_log(&record.title, 120), "New update found");
    }

    store::save(&state_path, &state, new_records.len()).await?;

    Ok((new_records.len(), state.records.len()))
}
