//! Record normalization: raw extraction candidates become canonical
//! [`UpdateRecord`]s or get rejected.
//!
//! Validation is record-level by design. A page with one malformed item
//! still yields the other nine; the caller logs and skips the reject.

use crate::error::ScrapeError;
use crate::fingerprint::fingerprint;
use crate::models::{RawUpdate, UpdateRecord};
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use url::Url;

/// Collapse interior whitespace runs and trim the ends.
///
/// Scraped headings often carry newlines and indentation from the page
/// markup; a title's identity shouldn't depend on them.
fn clean_text(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Turn a raw candidate into a canonical, fingerprinted [`UpdateRecord`].
///
/// The title is whitespace-normalized and must be non-empty. The link is
/// resolved against `base` (relative hrefs are routine on these pages)
/// and must also be non-empty. `scraped_date` is stamped by the caller
/// so every record in one run carries the same observation date.
///
/// # Errors
///
/// [`ScrapeError::InvalidRecord`] when the title or link is empty after
/// trimming, or the link can't be resolved to an absolute URL.
pub fn normalize(
    raw: RawUpdate,
    base: &Url,
    scraped_date: NaiveDate,
) -> Result<UpdateRecord, ScrapeError> {
    let title = clean_text(&raw.title);
    if title.is_empty() {
        return Err(ScrapeError::InvalidRecord("empty title".to_string()));
    }

    let link_raw = raw.link.trim();
    if link_raw.is_empty() {
        return Err(ScrapeError::InvalidRecord(format!(
            "empty link for \"{title}\""
        )));
    }
    let link = base
        .join(link_raw)
        .map_err(|e| ScrapeError::InvalidRecord(format!("unresolvable link {link_raw:?}: {e}")))?
        .to_string();

    let published_date = raw
        .published_date
        .map(|d| clean_text(&d))
        .filter(|d| !d.is_empty());

    let fingerprint = fingerprint(&title, &link);

    Ok(UpdateRecord {
        title,
        link,
        published_date,
        scraped_date,
        fingerprint,
    })
}
