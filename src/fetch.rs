//! Page fetching for the HTML-scraped sources.
//!
//! Thin by intent: a timeout, a monitoring User-Agent, and a status
//! check. Retry policy belongs to the scheduler that invokes the binary,
//! not here; a failed fetch simply fails that source for this run.

use crate::error::ScrapeError;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

/// Identifies this monitor to the sites it polls.
pub const USER_AGENT: &str = "ComplianceBot/1.0 (Compliance Monitoring)";

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Fetch a page body as text.
///
/// # Errors
///
/// [`ScrapeError::Fetch`] on transport failure (including timeout),
/// [`ScrapeError::BadStatus`] on a non-2xx response.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_page(url: &str, timeout: Duration) -> Result<String, ScrapeError> {
    let response = CLIENT.get(url).timeout(timeout).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::BadStatus {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    info!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// The shared HTTP client, for sources that talk to JSON APIs rather
/// than fetching HTML pages.
pub fn client() -> &'static Client {
    &CLIENT
}
