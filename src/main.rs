//! # Compliance Watch
//!
//! A compliance-monitoring pipeline that checks regulatory news sources
//! for updates, deduplicates them against persisted history, and writes
//! per-source state files plus a run summary for downstream automation.
//!
//! ## Features
//!
//! - Monitors NIST CSRC news, EDPB (GDPR) news, and the Federal Register
//!   documents API
//! - Content-addressed dedup: an update is "new" exactly once, across
//!   re-runs, restarts, and page churn
//! - Crash-safe persistence: state files are replaced atomically and a
//!   failed source never touches its history
//! - Emits GitHub Actions outputs (`new_updates`, `has_updates`) so a
//!   scheduled workflow can open notification issues
//! - Optional Markdown dashboard summarizing all tracked updates
//!
//! ## Usage
//!
//! ```sh
//! compliance_watch -o ./compliance --dashboard
//! ```
//!
//! ## Architecture
//!
//! One invocation is one run:
//! 1. **Extract**: Each source fetches its page/API and produces raw candidates
//! 2. **Normalize**: Candidates are validated, canonicalized, and fingerprinted
//! 3. **Reconcile**: Fingerprints are checked against persisted history
//! 4. **Persist**: Updated state and the run summary are written out
//!
//! Sources run concurrently and fail independently; the process exits
//! non-zero only when every source failed.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregator;
mod cli;
mod dedup;
mod error;
mod fetch;
mod fingerprint;
mod models;
mod normalize;
mod outputs;
mod runner;
mod sources;
mod store;
mod utils;

use cli::Cli;
use outputs::{dashboard, summary};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("compliance_watch starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.timeout_secs, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Run all configured sources ----
    let source_set = sources::configured_sources(&args);
    let timeout = Duration::from_secs(args.timeout_secs);
    let output_dir = Path::new(&args.output_dir);

    let run_summary = aggregator::run_all(&source_set, output_dir, timeout).await;

    // ---- Write run artifacts ----
    // The summary is always produced, even when every source failed.
    if let Err(e) = summary::write_summary(&run_summary, output_dir).await {
        error!(error = %e, "Failed to write run summary");
    }
    if let Err(e) = summary::write_actions_output(&run_summary).await {
        error!(error = %e, "Failed to write GitHub Actions outputs");
    }

    if args.dashboard {
        if let Err(e) = dashboard::write_dashboard(output_dir).await {
            error!(error = %e, "Failed to write dashboard");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        run_date = %run_summary.run_date.format("%Y-%m-%dT%H:%M:%S%z"),
        total_new = run_summary.total_new_updates,
        "Execution complete"
    );

    // Non-zero exit only when every source failed; a partial success
    // is a normal run.
    if run_summary.all_failed() {
        error!("Every configured source failed");
        return Err("all sources failed".into());
    }

    Ok(())
}
