//! European Data Protection Board news scraper.
//!
//! Scrapes the [EDPB news page](https://edpb.europa.eu/news/news_en) for
//! GDPR-related announcements. Simpler than the NIST page: one combined
//! selector covers the known item containers.

use crate::error::ScrapeError;
use crate::fetch::fetch_page;
use crate::models::RawUpdate;
use crate::sources::UpdateSource;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default EDPB news URL, overridable via `GDPR_URL`.
pub const DEFAULT_URL: &str = "https://edpb.europa.eu/news/news_en";

const MAX_ITEMS: usize = 10;

/// The GDPR/EDPB news source.
pub struct EdpbSource {
    url: String,
}

impl EdpbSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl UpdateSource for EdpbSource {
    fn name(&self) -> &str {
        "GDPR/EDPB"
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn output_file(&self) -> &str {
        "gdpr-updates.json"
    }

    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_candidates(&self, timeout: Duration) -> Result<Vec<RawUpdate>, ScrapeError> {
        let html = fetch_page(&self.url, timeout).await?;
        Ok(extract_updates(&html))
    }
}

/// Extract raw candidate updates from an EDPB news page.
pub fn extract_updates(html: &str) -> Vec<RawUpdate> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse(".news-list-item, .press-item, article").unwrap();
    let title_selector = Selector::parse("h3, h2, a").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();
    let date_selector = Selector::parse("time").unwrap();

    let mut updates = Vec::new();
    for item in document.select(&item_selector).take(MAX_ITEMS) {
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
            debug!("Skipping EDPB item without title or link");
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

    info!(count = updates.len(), "Extracted EDPB items");
    updates
}
