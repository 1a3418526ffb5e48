//! Data models for compliance updates and their persisted representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawUpdate`]: Unvalidated candidate straight out of a source's extractor
//! - [`UpdateRecord`]: Canonical, fingerprinted update (immutable once created)
//! - [`SourceState`]: Full per-source history plus the fingerprint index
//! - [`SourceDocument`] / [`SourceMetadata`]: On-disk shape of a source's state
//! - [`RunSummary`] / [`SourceRunResult`]: Per-invocation outcome artifact
//!
//! The on-disk field names (`hash`, `run_date`, ...) are part of the JSON
//! contract consumed by the dashboard and by CI, so they are pinned with
//! serde attributes rather than left to struct naming.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A raw candidate update as produced by a source's extractor.
///
/// Nothing about a `RawUpdate` is trusted yet: the title may be blank,
/// the link may be relative or empty. Candidates only become
/// [`UpdateRecord`]s by passing through [`crate::normalize::normalize`].
#[derive(Debug, Clone)]
pub struct RawUpdate {
    /// Item heading as found on the page or in the API response.
    pub title: String,
    /// Item link, possibly relative to the source page.
    pub link: String,
    /// Source-reported publication date, verbatim. Formats vary wildly
    /// between sources, so this stays a free-form string.
    pub published_date: Option<String>,
}

/// One discovered update, canonicalized and fingerprinted.
///
/// Records are immutable once created: the dedup engine only ever
/// appends records to history, never rewrites stored fields. The
/// fingerprint doubles as the record's identity, so it serializes under
/// the `hash` key the downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Update title, whitespace-normalized, never empty.
    pub title: String,
    /// Absolute URL of the update.
    pub link: String,
    /// Source-reported publication date, if the page carried one.
    pub published_date: Option<String>,
    /// The date this record was first observed by us.
    pub scraped_date: NaiveDate,
    /// Hex SHA-256 over title + link. Stable across runs and restarts.
    #[serde(rename = "hash")]
    pub fingerprint: String,
}

/// Everything we know about one monitored source.
///
/// Loaded from disk at the start of a source run, amended by the dedup
/// engine, and rewritten on success. `records` is newest-observed-first
/// and unbounded; `known_fingerprints` is an O(1) membership index over
/// it, rebuilt from `records` on every load rather than persisted.
#[derive(Debug, Clone)]
pub struct SourceState {
    /// URL of the monitored page or API endpoint.
    pub source_url: String,
    /// Human-readable source name (e.g. "NIST").
    pub source_name: String,
    /// Timestamp of the most recent successful run, if any.
    pub last_checked: Option<DateTime<Utc>>,
    /// Full history, newest-observed-first.
    pub records: Vec<UpdateRecord>,
    /// Every fingerprint appearing in `records`.
    pub known_fingerprints: HashSet<String>,
}

impl SourceState {
    /// An empty state for a source with no prior history.
    pub fn empty(source_url: &str, source_name: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            source_name: source_name.to_string(),
            last_checked: None,
            records: Vec::new(),
            known_fingerprints: HashSet::new(),
        }
    }
}

/// On-disk metadata block of a per-source state document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// URL of the monitored page or API endpoint.
    pub source: String,
    /// Human-readable source name.
    pub source_name: String,
    /// When this document was last rewritten by a successful run.
    pub last_checked: DateTime<Utc>,
    /// Version of this binary at write time, for artifact archaeology.
    pub scraper_version: String,
    /// Total records in the `updates` array.
    pub total_updates: usize,
    /// How many of those were first observed by the writing run.
    pub new_updates: usize,
}

/// On-disk shape of a per-source state artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub metadata: SourceMetadata,
    pub updates: Vec<UpdateRecord>,
}

/// Outcome of running a single source end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRunResult {
    /// Source name, matching [`SourceMetadata::source_name`].
    pub source: String,
    /// Whether extraction, reconciliation, and persistence all succeeded.
    pub success: bool,
    /// Records first observed this run. Zero on failure.
    pub new_count: usize,
    /// Total records in the source's history after this run. Zero on failure.
    pub total_count: usize,
    /// Human-readable failure description when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceRunResult {
    /// A failed outcome carrying an error description.
    pub fn failed(source: &str, error: impl ToString) -> Self {
        Self {
            source: source.to_string(),
            success: false,
            new_count: 0,
            total_count: 0,
            error: Some(error.to_string()),
        }
    }
}

/// The per-invocation run summary, overwritten each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When this run happened.
    pub run_date: DateTime<Utc>,
    /// Sum of `new_count` over successful sources.
    pub total_new_updates: usize,
    /// Per-source outcomes, in configuration order.
    pub sources: Vec<SourceRunResult>,
}

impl RunSummary {
    /// The notification signal consumed by CI: anything new anywhere?
    pub fn has_updates(&self) -> bool {
        self.total_new_updates > 0
    }

    /// True when every configured source failed. A partial success is
    /// not a fatal run; an all-source failure is.
    pub fn all_failed(&self) -> bool {
        !self.sources.is_empty() && self.sources.iter().all(|s| !s.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(title: &str) -> UpdateRecord {
        UpdateRecord {
            title: title.to_string(),
            link: "https://example.org/a".to_string(),
            published_date: Some("May 6, 2025".to_string()),
            scraped_date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            fingerprint: "abc123".to_string(),
        }
    }

    #[test]
    fn test_update_record_serializes_fingerprint_as_hash() {
        let json = serde_json::to_string(&record("Test Update")).unwrap();
        assert!(json.contains("\"hash\":\"abc123\""));
        assert!(!json.contains("fingerprint"));
    }

    #[test]
    fn test_update_record_roundtrip() {
        let rec = record("Test Update");
        let json = serde_json::to_string(&rec).unwrap();
        let back: UpdateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_source_document_deserialization() {
        let json = r#"{
            "metadata": {
                "source": "https://csrc.nist.gov/news",
                "source_name": "NIST",
                "last_checked": "2025-05-06T12:00:00Z",
                "scraper_version": "0.2.0",
                "total_updates": 1,
                "new_updates": 1
            },
            "updates": [
                {
                    "title": "Security Update",
                    "link": "https://csrc.nist.gov/news/2025/update",
                    "published_date": null,
                    "scraped_date": "2025-05-06",
                    "hash": "deadbeef"
                }
            ]
        }"#;

        let doc: SourceDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.metadata.source_name, "NIST");
        assert_eq!(doc.updates.len(), 1);
        assert_eq!(doc.updates[0].fingerprint, "deadbeef");
    }

    #[test]
    fn test_empty_state() {
        let state = SourceState::empty("https://example.org", "Example");
        assert!(state.records.is_empty());
        assert!(state.known_fingerprints.is_empty());
        assert!(state.last_checked.is_none());
    }

    #[test]
    fn test_run_summary_signals() {
        let ok = SourceRunResult {
            source: "NIST".to_string(),
            success: true,
            new_count: 2,
            total_count: 12,
            error: None,
        };
        let failed = SourceRunResult::failed("GDPR/EDPB", "boom");

        let summary = RunSummary {
            run_date: Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap(),
            total_new_updates: 2,
            sources: vec![ok, failed.clone()],
        };
        assert!(summary.has_updates());
        assert!(!summary.all_failed());

        let all_down = RunSummary {
            run_date: Utc::now(),
            total_new_updates: 0,
            sources: vec![failed.clone(), SourceRunResult::failed("NIST", "also boom")],
        };
        assert!(!all_down.has_updates());
        assert!(all_down.all_failed());
    }

    #[test]
    fn test_failed_result_serializes_error() {
        let failed = SourceRunResult::failed("NIST", "fetch failed");
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"error\":\"fetch failed\""));

        let ok = SourceRunResult {
            source: "NIST".to_string(),
            success: true,
            new_count: 0,
            total_count: 5,
            error: None,
        };
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("error"));
    }
}
