//! Run aggregation: every configured source, one summary.
//!
//! Sources run concurrently (each owns a distinct state artifact, so
//! there is nothing to coordinate), but their outcomes land in the
//! summary in configuration order, which keeps artifact diffs stable
//! from run to run. A source failure is data, not an error: it shows up
//! as `success: false` in the summary and contributes zero to the new
//! total.

use crate::models::RunSummary;
use crate::runner::run_source;
use crate::sources::UpdateSource;
use chrono::Utc;
use futures::future::join_all;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Run every source and build the run summary.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run_all(
    sources: &[Box<dyn UpdateSource>],
    output_dir: &Path,
    timeout: Duration,
) -> RunSummary {
    let outcomes = join_all(
        sources
            .iter()
            .map(|source| run_source(source.as_ref(), output_dir, timeout)),
    )
    .await;

    let total_new_updates = outcomes
        .iter()
        .filter(|o| o.success)
        .map(|o| o.new_count)
        .sum();

    let summary = RunSummary {
        run_date: Utc::now(),
        total_new_updates,
        sources: outcomes,
    };

    info!(
        total_new = summary.total_new_updates,
        failed = summary.sources.iter().filter(|s| !s.success).count(),
        "Run complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::models::RawUpdate;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct FakeSource {
        name: String,
        output_file: String,
        candidates: Result<Vec<RawUpdate>, ()>,
    }

    impl FakeSource {
        fn with(name: &str, candidates: Vec<RawUpdate>) -> Box<dyn UpdateSource> {
            Box::new(Self {
                name: name.to_string(),
                output_file: format!("{}-updates.json", name.to_lowercase()),
                candidates: Ok(candidates),
            })
        }

        fn failing(name: &str) -> Box<dyn UpdateSource> {
            Box::new(Self {
                name: name.to_string(),
                output_file: format!("{}-updates.json", name.to_lowercase()),
                candidates: Err(()),
            })
        }
    }

    #[async_trait]
    impl UpdateSource for FakeSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn url(&self) -> &str {
            "https://example.org/news"
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }

        async fn fetch_candidates(
            &self,
            _timeout: Duration,
        ) -> Result<Vec<RawUpdate>, ScrapeError> {
            match &self.candidates {
                Ok(candidates) => Ok(candidates.clone()),
                Err(()) => Err(ScrapeError::BadStatus {
                    url: self.url().to_string(),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                }),
            }
        }
    }

    fn scratch_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "compliance_watch_aggregator_{}_{}",
            test,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn candidate(title: &str, link: &str) -> RawUpdate {
        RawUpdate {
            title: title.to_string(),
            link: link.to_string(),
            published_date: None,
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn test_partial_failure_sums_only_successes() {
        let dir = scratch_dir("partial_failure");
        let sources = vec![
            FakeSource::with(
                "Alpha",
                vec![
                    candidate("a", "https://x.org/a"),
                    candidate("b", "https://x.org/b"),
                ],
            ),
            FakeSource::failing("Beta"),
        ];

        let summary = run_all(&sources, &dir, timeout()).await;

        assert_eq!(summary.total_new_updates, 2);
        assert_eq!(summary.sources.len(), 2);
        assert!(summary.sources[0].success);
        assert!(!summary.sources[1].success);
        assert!(summary.has_updates());
        assert!(!summary.all_failed());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_other_source() {
        let dir = scratch_dir("isolation");
        let sources = vec![
            FakeSource::failing("Alpha"),
            FakeSource::with("Beta", vec![candidate("b", "https://x.org/b")]),
        ];

        let summary = run_all(&sources, &dir, timeout()).await;

        assert!(!summary.sources[0].success);
        assert!(summary.sources[1].success);
        assert!(!dir.join("alpha-updates.json").exists());
        assert!(dir.join("beta-updates.json").exists());
    }

    #[tokio::test]
    async fn test_outcomes_follow_configuration_order() {
        let dir = scratch_dir("order");
        let sources = vec![
            FakeSource::with("Gamma", vec![candidate("g", "https://x.org/g")]),
            FakeSource::with("Alpha", vec![candidate("a", "https://x.org/a")]),
            FakeSource::failing("Beta"),
        ];

        let summary = run_all(&sources, &dir, timeout()).await;

        let names: Vec<&str> = summary.sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_all_failed_run_still_summarizes() {
        let dir = scratch_dir("all_failed");
        let sources = vec![FakeSource::failing("Alpha"), FakeSource::failing("Beta")];

        let summary = run_all(&sources, &dir, timeout()).await;

        assert_eq!(summary.total_new_updates, 0);
        assert!(summary.all_failed());
        assert!(!summary.has_updates());
        assert_eq!(summary.sources.len(), 2);
    }
}
