//! Markdown dashboard generation.
//!
//! Renders every per-source state document plus the latest run summary
//! into a single `dashboard.md` for humans. Regenerated from the
//! artifacts on disk each time; the dashboard never feeds back into
//! scraping or dedup, so a rendering bug can't corrupt anything.
//!
//! A record counts as "new" when it sits in the head slice the writing
//! run prepended (the metadata's `new_updates` count).

use crate::error::ScrapeError;
use crate::models::{RunSummary, SourceDocument};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Most recent records shown per source.
const MAX_ITEMS_PER_SOURCE: usize = 15;

/// Render and write `dashboard.md` from the artifacts in `output_dir`.
///
/// Unreadable or missing artifacts are skipped with a warning rather
/// than failing the render; the dashboard reflects whatever is legible.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_dashboard(output_dir: &Path) -> Result<PathBuf, ScrapeError> {
    let documents = load_source_documents(output_dir).await;
    let summary = load_summary(output_dir).await;

    let markdown = render(&documents, summary.as_ref());

    let path = output_dir.join("dashboard.md");
    fs::write(&path, markdown).await.map_err(|e| ScrapeError::Io {
        path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), sources = documents.len(), "Wrote dashboard");
    Ok(path)
}

/// Load every `*-updates.json` document in the output directory,
/// sorted by file name for a stable section order.
async fn load_source_documents(output_dir: &Path) -> Vec<SourceDocument> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("-updates.json"))
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Could not list output directory");
            return Vec::new();
        }
    };
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<SourceDocument>(&content) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable state document"),
            },
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable state file"),
        }
    }
    documents
}

async fn load_summary(output_dir: &Path) -> Option<RunSummary> {
    let content = fs::read_to_string(output_dir.join("summary.json")).await.ok()?;
    serde_json::from_str(&content).ok()
}

/// Build the dashboard Markdown.
fn render(documents: &[SourceDocument], summary: Option<&RunSummary>) -> String {
    let mut md = String::new();

    writeln!(md, "# Compliance Updates Dashboard\n").unwrap();

    if let Some(summary) = summary {
        writeln!(
            md,
            "_Last run: {} - **{}** new update(s)_\n",
            summary.run_date.format("%Y-%m-%d %H:%M UTC"),
            summary.total_new_updates
        )
        .unwrap();

        for outcome in &summary.sources {
            let status = if outcome.success { "ok" } else { "FAILED" };
            writeln!(
                md,
                "- {}: {} ({} new / {} total)",
                outcome.source, status, outcome.new_count, outcome.total_count
            )
            .unwrap();
        }
        writeln!(md).unwrap();
    }

    if documents.is_empty() {
        writeln!(md, "_No source data collected yet._").unwrap();
        return md;
    }

    let total_tracked: usize = documents.iter().map(|d| d.metadata.total_updates).sum();
    writeln!(
        md,
        "Tracking **{}** update(s) across **{}** source(s).\n",
        total_tracked,
        documents.len()
    )
    .unwrap();

    for doc in documents {
        writeln!(
            md,
            "## {} - {} tracked, {} new",
            doc.metadata.source_name, doc.metadata.total_updates, doc.metadata.new_updates
        )
        .unwrap();
        writeln!(
            md,
            "_Source: <{}> - last checked {}_\n",
            doc.metadata.source,
            doc.metadata.last_checked.format("%Y-%m-%d %H:%M UTC")
        )
        .unwrap();

        for (i, record) in doc.updates.iter().take(MAX_ITEMS_PER_SOURCE).enumerate() {
            let new_marker = if i < doc.metadata.new_updates {
                " **(new)**"
            } else {
                ""
            };
            let date = record
                .published_date
                .clone()
                .unwrap_or_else(|| record.scraped_date.to_string());
            writeln!(
                md,
                "- [{}]({}) - {}{}",
                record.title, record.link, date, new_marker
            )
            .unwrap();
        }

        if doc.updates.len() > MAX_ITEMS_PER_SOURCE {
            writeln!(
                md,
                "- _…and {} older update(s)_",
                doc.updates.len() - MAX_ITEMS_PER_SOURCE
            )
            .unwrap();
        }
        writeln!(md).unwrap();
    }

    md
}
