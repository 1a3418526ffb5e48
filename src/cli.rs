//! Command-line interface definitions for the compliance monitor.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The environment-variable fallbacks (`SCRAPE_TIMEOUT`, `NIST_URL`,
//! `GDPR_URL`) match what the scheduled CI workflow sets, so the binary
//! runs identically from a shell and from cron.

use clap::Parser;

/// Command-line arguments for the compliance monitor.
///
/// # Examples
///
/// ```sh
/// # Default run: artifacts land in ./compliance
/// compliance_watch
///
/// # Custom output directory, with the dashboard rendered afterwards
/// compliance_watch -o ./state --dashboard
///
/// # Point the NIST source at a mirror
/// NIST_URL=https://mirror.example.org/news compliance_watch
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for per-source state files and the run summary
    #[arg(short, long, default_value = "compliance")]
    pub output_dir: String,

    /// Render the Markdown dashboard after the run
    #[arg(long)]
    pub dashboard: bool,

    /// HTTP timeout per request, in seconds
    #[arg(long, env = "SCRAPE_TIMEOUT", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Override the NIST CSRC news URL
    #[arg(long, env = "NIST_URL")]
    pub nist_url: Option<String>,

    /// Override the EDPB news URL
    #[arg(long, env = "GDPR_URL")]
    pub edpb_url: Option<String>,
}
