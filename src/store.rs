//! Persistence for per-source state documents.
//!
//! One JSON artifact per source, schema-stable so the dashboard and CI
//! can read it. Two guarantees matter here:
//!
//! 1. **Absent is not an error.** A missing artifact means "first run"
//!    and loads as an empty state. A present-but-unparseable artifact is
//!    a distinct failure that aborts the source run and leaves the file
//!    exactly as it was found.
//! 2. **Saves are atomic.** The document is written to a `.tmp` sibling
//!    and renamed over the target, so a crash mid-write can't leave a
//!    half-written artifact to poison the next load.
//!
//! The module also exposes [`StoreLock`], an advisory lock file for
//! callers that might run the same source concurrently. The scheduler is
//! expected to run each source at most once at a time; the lock is the
//! escape hatch for when that assumption breaks.

use crate::error::ScrapeError;
use crate::models::{SourceDocument, SourceMetadata, SourceState};
use chrono::Utc;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Load a source's persisted state, or an empty state if none exists.
///
/// `source_url` and `source_name` come from configuration and take
/// precedence over whatever an older artifact recorded, so renaming a
/// source in config doesn't orphan its history.
///
/// # Errors
///
/// [`ScrapeError::CorruptState`] if the artifact exists but is not valid
/// JSON for the expected schema; [`ScrapeError::Io`] for any read
/// failure other than the file being absent.
pub async fn load(
    path: &Path,
    source_url: &str,
    source_name: &str,
) -> Result<SourceState, ScrapeError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no prior state; starting empty");
            return Ok(SourceState::empty(source_url, source_name));
        }
        Err(e) => {
            return Err(ScrapeError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let doc: SourceDocument =
        serde_json::from_str(&content).map_err(|e| ScrapeError::CorruptState {
            path: path.to_path_buf(),
            source: e,
        })?;

    let known_fingerprints: HashSet<String> = doc
        .updates
        .iter()
        .map(|r| r.fingerprint.clone())
        .collect();

    debug!(
        path = %path.display(),
        records = doc.updates.len(),
        "loaded prior state"
    );

    Ok(SourceState {
        source_url: source_url.to_string(),
        source_name: source_name.to_string(),
        last_checked: Some(doc.metadata.last_checked),
        records: doc.updates,
        known_fingerprints,
    })
}

/// Persist a source's state, atomically replacing any prior artifact.
///
/// `new_count` is recorded in the metadata block so downstream readers
/// can see what the writing run contributed without diffing histories.
pub async fn save(path: &Path, state: &SourceState, new_count: usize) -> Result<(), ScrapeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| ScrapeError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let doc = SourceDocument {
        metadata: SourceMetadata {
            source: state.source_url.clone(),
            source_name: state.source_name.clone(),
            last_checked: Utc::now(),
            scraper_version: env!("CARGO_PKG_VERSION").to_string(),
            total_updates: state.records.len(),
            new_updates: new_count,
        },
        updates: state.records.clone(),
    };

    let json = serde_json::to_string_pretty(&doc).map_err(|e| ScrapeError::SerializeState {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await.map_err(|e| ScrapeError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).await.map_err(|e| ScrapeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(
        path = %path.display(),
        total = doc.metadata.total_updates,
        new = new_count,
        "Saved source state"
    );
    Ok(())
}

/// Advisory lock over a source's state artifact.
///
/// Created with `create_new`, so the first taker wins and a second run
/// against the same source fails fast instead of interleaving loads and
/// saves. Released (the lock file removed) on drop. A stale lock left by
/// a killed process must be removed by hand: the artifact it guards is
/// exactly what a killed run may have been touching.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Try to take the lock for the given state artifact path.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::StateLocked`] if another holder exists;
    /// [`ScrapeError::Io`] for any other filesystem failure.
    pub fn acquire(state_path: &Path) -> Result<Self, ScrapeError> {
        if let Some(parent) = state_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScrapeError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let path = state_path.with_extension("lock");
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(ScrapeError::StateLocked { path })
            }
            Err(e) => Err(ScrapeError::Io { path, source: e }),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
