//! Federal Register documents API source.
//!
//! Unlike the HTML sources, this one queries the
//! [Federal Register API](https://www.federalregister.gov/developers/documents-api)
//! for recent documents from a fixed set of agencies. The API already
//! returns structured JSON, so "extraction" is just field mapping; the
//! normalize/dedup/persist pipeline downstream is identical.
//!
//! The query window is a rolling seven days. Re-fetching the same window
//! every run is what the dedup layer is for: documents seen in a prior
//! run fingerprint identically and are dropped at reconcile time.

use crate::error::ScrapeError;
use crate::fetch::client;
use crate::models::RawUpdate;
use crate::sources::UpdateSource;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Federal Register documents endpoint.
pub const API_URL: &str = "https://www.federalregister.gov/api/v1/documents.json";

/// Agency slugs to monitor, from <https://www.federalregister.gov/agencies>.
pub const MONITORED_AGENCIES: &[&str] = &[
    "labor-department",
    "animal-and-plant-health-inspection-service",
];

const LOOKBACK_DAYS: i64 = 7;
const PER_PAGE: u32 = 50;

/// The Federal Register source.
pub struct FederalRegisterSource {
    agencies: Vec<String>,
}

impl FederalRegisterSource {
    pub fn new(agencies: &[&str]) -> Self {
        Self {
            agencies: agencies.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Subset of the API's document fields we request and keep.
#[derive(Debug, Deserialize)]
struct ApiDocument {
    title: Option<String>,
    html_url: Option<String>,
    publication_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiDocument>,
}

#[async_trait]
impl UpdateSource for FederalRegisterSource {
    fn name(&self) -> &str {
        "Federal Register"
    }

    fn url(&self) -> &str {
        API_URL
    }

    fn output_file(&self) -> &str {
        "federal-register-updates.json"
    }

    #[instrument(level = "info", skip_all, fields(agencies = self.agencies.len()))]
    async fn fetch_candidates(&self, timeout: Duration) -> Result<Vec<RawUpdate>, ScrapeError> {
        let since = (Utc::now() - ChronoDuration::days(LOOKBACK_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        info!(%since, "Fetching Federal Register documents");

        let mut query: Vec<(String, String)> = vec![
            ("per_page".to_string(), PER_PAGE.to_string()),
            ("order".to_string(), "newest".to_string()),
            (
                "conditions[publication_date][gte]".to_string(),
                since.clone(),
            ),
        ];
        for field in ["title", "type", "abstract", "html_url", "publication_date", "agencies"] {
            query.push(("fields[]".to_string(), field.to_string()));
        }
        for agency in &self.agencies {
            query.push(("conditions[agencies][]".to_string(), agency.clone()));
        }

        let response = client()
            .get(API_URL)
            .query(&query)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::BadStatus {
                url: API_URL.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        let decoded: ApiResponse =
            serde_json::from_str(&body).map_err(|e| ScrapeError::Api {
                url: API_URL.to_string(),
                source: e,
            })?;

        info!(count = decoded.results.len(), "Found Federal Register documents");
        Ok(map_documents(decoded.results))
    }
}

/// Map API documents onto raw candidates, dropping any without both a
/// title and a link.
fn map_documents(documents: Vec<ApiDocument>) -> Vec<RawUpdate> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let title = doc.title?;
            let link = doc.html_url?;
            Some(RawUpdate {
                title,
                link,
                published_date: doc.publication_date,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_maps_to_candidates() {
        let body = r#"{
            "count": 2,
            "results": [
                {
                    "title": "Proposed Rule on Workplace Safety",
                    "type": "Proposed Rule",
                    "abstract": "…",
                    "html_url": "https://www.federalregister.gov/d/2025-01",
                    "publication_date": "2025-05-05",
                    "agencies": [{"name": "Labor Department"}]
                },
                {
                    "title": "Notice Without Link",
                    "html_url": null,
                    "publication_date": "2025-05-04"
                }
            ]
        }"#;

        let decoded: ApiResponse = serde_json::from_str(body).unwrap();
        let candidates = map_documents(decoded.results);

        assert_eq!(candidates.len(), 1, "documents without a link are dropped");
        assert_eq!(candidates[0].title, "Proposed Rule on Workplace Safety");
        assert_eq!(candidates[0].link, "https://www.federalregister.gov/d/2025-01");
        assert_eq!(candidates[0].published_date.as_deref(), Some("2025-05-05"));
    }

    #[test]
    fn test_missing_results_key_decodes_as_empty() {
        let decoded: ApiResponse = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(decoded.results.is_empty());
    }
}
