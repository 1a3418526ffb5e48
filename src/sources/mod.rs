//! Monitored compliance sources.
//!
//! Each source knows how to turn its upstream page or API into raw
//! candidate updates; everything downstream (normalization, dedup,
//! persistence) is source-agnostic and lives in the runner.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | NIST CSRC | [`nist`] | HTML scraping | News page; selector fallback list |
//! | GDPR/EDPB | [`edpb`] | HTML scraping | EU data-protection board news |
//! | Federal Register | [`federal_register`] | Documents API | Agency slugs, 7-day lookback |
//!
//! # Common Patterns
//!
//! Each HTML module exports a pure `extract_updates(html)` function so
//! parsing is testable against canned pages, plus a source type
//! implementing [`UpdateSource`] that pairs it with the fetch layer.
//! Extraction is deliberately tolerant: items missing a title or link
//! are dropped, and date elements are optional.

pub mod edpb;
pub mod federal_register;
pub mod nist;

use crate::cli::Cli;
use crate::error::ScrapeError;
use crate::models::RawUpdate;
use async_trait::async_trait;
use std::time::Duration;

/// A monitored source, pluggable into the source runner.
///
/// Implementations produce zero or more raw candidates or fail with an
/// extraction-class error; they never touch persisted state.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Human-readable source name, used in artifacts and logs.
    fn name(&self) -> &str;

    /// The monitored URL. Doubles as the base for resolving relative
    /// links found in this source's items.
    fn url(&self) -> &str;

    /// File name of this source's state artifact inside the output
    /// directory. Distinct per source; this is what makes concurrent
    /// source runs safe without cross-source locking.
    fn output_file(&self) -> &str;

    /// Fetch the upstream page or API and extract raw candidates.
    async fn fetch_candidates(&self, timeout: Duration) -> Result<Vec<RawUpdate>, ScrapeError>;
}

/// The source set for one run, honoring CLI/env URL overrides.
pub fn configured_sources(args: &Cli) -> Vec<Box<dyn UpdateSource>> {
    vec![
        Box::new(nist::NistSource::new(
            args.nist_url.as_deref().unwrap_or(nist::DEFAULT_URL),
        )),
        Box::new(edpb::EdpbSource::new(
            args.edpb_url.as_deref().unwrap_or(edpb::DEFAULT_URL),
        )),
        Box::new(federal_register::FederalRegisterSource::new(
            federal_register::MONITORED_AGENCIES,
        )),
    ]
}
