//! NIST Computer Security Resource Center news scraper.
//!
//! Scrapes [CSRC news](https://csrc.nist.gov/news). The page structure
//! has shifted over time, so extraction tries a list of container
//! selectors in order and takes the first that matches anything. At most
//! ten items are considered per run; the page is reverse-chronological,
//! so older entries are already in history.

use crate::error::ScrapeError;
use crate::fetch::fetch_page;
use crate::models::RawUpdate;
use crate::sources::UpdateSource;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default NIST CSRC news URL, overridable via `NIST_URL`.
pub const DEFAULT_URL: &str = "https://csrc.nist.gov/news";

/// Container selectors tried in order; first hit wins.
const ITEM_SELECTORS: &[&str] = &[".document-wrapper", ".news-item", "article", ".item"];

const MAX_ITEMS: usize = 10;

/// The NIST CSRC news source.
pub struct NistSource {
    url: String,
}

impl NistSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl UpdateSource for NistSource {
    fn name(&self) -> &str {
        "NIST"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn output_file(&self) -> &str {
        "nist-updates.json"
    }

    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_candidates(&self, timeout: Duration) -> Result<Vec<RawUpdate>, ScrapeError> {
        let html = fetch_page(&self.url, timeout).await?;
        Ok(extract_updates(&html))
    }
}

/// Extract raw candidate updates from a CSRC news page.
///
/// For each matched container, the title comes from the first heading
/// (falling back to the link text), the link from the first `a[href]`,
/// and the date from a `time`/`span` tagged `date` or `published`.
/// Containers missing a title or link are skipped.
pub fn extract_updates(html: &str) -> Vec<RawUpdate> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("h4, h3, h2, a").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();
    let date_selector =
        Selector::parse("time.date, time.published, span.date, span.published").unwrap();

    let mut items = Vec::new();
    for candidate in ITEM_SELECTORS {
        let selector = Selector::parse(candidate).unwrap();
        items = document.select(&selector).take(MAX_ITEMS).collect();
        if !items.is_empty() {
            info!(selector = candidate, count = items.len(), "Found NIST items");
            break;
        }
    }
    if items.is_empty() {
        warn!("No NIST items matched any known selector");
        return Vec::new();
    }

    let mut updates = Vec::new();
    for item in items {
        let title = item
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "));
        let link = item
            .select(&link_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::to_string);

        let (Some(title), Some(link)) = (title, link) else {
            debug!("Skipping NIST item without title or link");
            continue;
        };

        let published_date = item
            .select(&date_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "));

        updates.push(RawUpdate {
            title,
            link,
            published_date,
        });
    }

    updates
}
