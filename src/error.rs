//! Error taxonomy for the scraping and persistence pipeline.
//!
//! Errors fall into three classes with different blast radii:
//!
//! - **Extraction** ([`Fetch`](ScrapeError::Fetch),
//!   [`BadStatus`](ScrapeError::BadStatus), [`Api`](ScrapeError::Api),
//!   [`NoUpdates`](ScrapeError::NoUpdates)): the whole source fails for
//!   this run, persisted state is left untouched.
//! - **Validation** ([`InvalidRecord`](ScrapeError::InvalidRecord)): a
//!   single candidate is skipped, the source continues.
//! - **Persistence** ([`Io`](ScrapeError::Io),
//!   [`CorruptState`](ScrapeError::CorruptState),
//!   [`StateLocked`](ScrapeError::StateLocked)): the source fails and
//!   the in-memory update for this run is discarded.
//!
//! None of these escape the source runner as `Err`; they are folded into
//! the per-source result so one broken source never sinks the run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// HTTP transport failure while fetching a page or API endpoint.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered, but not with a page we can use.
    #[error("unexpected status {status} from {url}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The Federal Register API returned a body we could not decode.
    #[error("api response from {url} did not match the expected shape: {source}")]
    Api {
        url: String,
        source: serde_json::Error,
    },

    /// Extraction ran but found nothing. Treated as a source failure so
    /// a silent site redesign can't slowly erase history.
    #[error("no updates found for {0}")]
    NoUpdates(String),

    /// A single raw candidate failed normalization.
    #[error("invalid candidate: {0}")]
    InvalidRecord(String),

    /// Filesystem failure reading or writing a store artifact.
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The state file exists but is not parseable. Distinct from an
    /// absent file: absent means "first run", corrupt means "stop and
    /// leave the artifact alone".
    #[error("state file {path:?} is unreadable: {source}")]
    CorruptState {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// State could not be serialized for writing.
    #[error("could not serialize state for {path:?}: {source}")]
    SerializeState {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Another run holds the advisory lock for this source.
    #[error("state file {path:?} is locked by another run")]
    StateLocked { path: PathBuf },
}
