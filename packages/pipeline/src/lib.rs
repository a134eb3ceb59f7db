#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The insolation acquisition pipeline: batch orchestration,
//! normalization, reconciliation, and the full run driver.
//!
//! A run is one logical unit of work: enumerate the fixed image set,
//! fetch and extract in bounded-concurrency batches, resolve city
//! names against the gazetteer, collapse duplicate observations by
//! natural key, and propose the result to storage. Every run is
//! independent — no state crosses run boundaries.

pub mod batch;
pub mod reconcile;

use std::time::Instant;

use sun_map_models::{ExtractionResult, ImageSource, NormalizedObservation, RunSummary};
use sun_map_source::fetch::Fetcher;
use sun_map_storage::InsolationStore;
use thiserror::Error;

/// Errors that can occur during a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetching an image failed after retries.
    #[error(transparent)]
    Fetch(#[from] sun_map_source::FetchError),

    /// Vision extraction failed for an image.
    #[error(transparent)]
    Extract(#[from] sun_map_ai::ExtractError),

    /// The storage upsert failed.
    #[error(transparent)]
    Storage(#[from] sun_map_storage::StorageError),

    /// Every image in the run failed — there is nothing to reconcile.
    #[error("no images were successfully extracted")]
    NoResults,
}

/// The per-image operation the orchestrator fans out: fetch one image
/// and extract its readings.
///
/// Abstracted as a trait so tests can substitute deterministic
/// analyzers for the network-bound production implementation.
#[async_trait::async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Fetches and analyzes one forecast-map image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the fetch or the extraction fails.
    async fn analyze_source(
        &self,
        source: &ImageSource,
    ) -> Result<ExtractionResult, PipelineError>;
}

/// Production [`ImageAnalyzer`]: HTTP fetch followed by a vision call.
pub struct FetchExtractAnalyzer {
    fetcher: Fetcher,
    extractor: sun_map_ai::Extractor,
}

impl FetchExtractAnalyzer {
    /// Creates the production analyzer around a vision provider.
    #[must_use]
    pub fn new(provider: Box<dyn sun_map_ai::providers::VisionProvider>) -> Self {
        Self {
            fetcher: Fetcher::new(),
            extractor: sun_map_ai::Extractor::new(provider),
        }
    }
}

#[async_trait::async_trait]
impl ImageAnalyzer for FetchExtractAnalyzer {
    async fn analyze_source(
        &self,
        source: &ImageSource,
    ) -> Result<ExtractionResult, PipelineError> {
        let image = self.fetcher.fetch(&source.url).await?;
        Ok(self.extractor.analyze(&image).await?)
    }
}

/// Executes one full pipeline run over the fixed image set.
///
/// See [`run_with_sources`] for semantics; this entry point enumerates
/// the sources itself.
///
/// # Errors
///
/// Returns [`PipelineError::NoResults`] when zero images extracted
/// successfully.
pub async fn run(
    analyzer: &dyn ImageAnalyzer,
    store: &dyn InsolationStore,
    dry_run: bool,
) -> Result<RunSummary, PipelineError> {
    let sources = sun_map_source::registry::list_sources();
    run_with_sources(analyzer, store, &sources, dry_run).await
}

/// Executes one full pipeline run over the given image sources.
///
/// Individual image failures are recorded in the summary, never
/// escalated; a failed storage upsert is reported as a run-level error
/// string with `database_writes = 0`. In a dry run the persistence
/// step is skipped but the would-be write count is still reported.
///
/// # Errors
///
/// Returns [`PipelineError::NoResults`] only when zero images
/// extracted successfully — partial failure is a normal outcome.
pub async fn run_with_sources(
    analyzer: &dyn ImageAnalyzer,
    store: &dyn InsolationStore,
    sources: &[ImageSource],
    dry_run: bool,
) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();
    log::info!(
        "Starting pipeline run over {} images (dry_run={dry_run})",
        sources.len()
    );

    let (results, mut errors) = batch::run_batches(analyzer, sources).await;
    let processed_images = results.len() as u64;
    let failed_images = errors.len() as u64;

    if results.is_empty() {
        return Err(PipelineError::NoResults);
    }

    let observations = normalize_results(&results);
    let records = reconcile::reconcile(&observations);
    log::info!(
        "Reconciled {} observations into {} records",
        observations.len(),
        records.len()
    );

    let database_writes = if dry_run {
        log::info!(
            "Dry run — skipping upsert of {} records",
            records.len()
        );
        records.len() as u64
    } else {
        match store.upsert(&records).await {
            Ok(written) => written,
            Err(e) => {
                log::error!("Storage upsert failed: {e}");
                errors.push(format!("storage upsert failed: {e}"));
                0
            }
        }
    };

    log::info!(
        "Run complete: {processed_images} processed, {failed_images} failed, \
         {database_writes} writes, took {:.1}s",
        start.elapsed().as_secs_f64()
    );

    Ok(RunSummary {
        processed_images,
        failed_images,
        database_writes,
        errors,
        dry_run,
    })
}

/// Resolves every extracted city reading against the gazetteer,
/// dropping unrecognized and zero-valued observations.
fn normalize_results(results: &[ExtractionResult]) -> Vec<NormalizedObservation> {
    results
        .iter()
        .flat_map(|result| {
            result.cities.iter().filter_map(|raw| {
                sun_map_gazetteer::normalize(raw, result.capture_date, result.capture_hour)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sun_map_models::RawCityObservation;
    use sun_map_storage::MemoryStore;

    /// Analyzer that fails for one configured URL and returns a single
    /// configured city reading for every other source.
    struct MockAnalyzer {
        fail_url: Option<String>,
        city_for_tag: fn(u16) -> &'static str,
    }

    #[async_trait::async_trait]
    impl ImageAnalyzer for MockAnalyzer {
        async fn analyze_source(
            &self,
            source: &ImageSource,
        ) -> Result<ExtractionResult, PipelineError> {
            if self.fail_url.as_deref() == Some(source.url.as_str()) {
                return Err(PipelineError::Extract(sun_map_ai::ExtractError::Provider {
                    message: "simulated failure".to_string(),
                }));
            }
            Ok(ExtractionResult {
                capture_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                capture_hour: 12,
                cities: vec![RawCityObservation {
                    name: (self.city_for_tag)(source.percentage_tag).to_string(),
                    province: None,
                    insolation_percentage: f64::from(source.percentage_tag),
                }],
            })
        }
    }

    fn sources(n: u16) -> Vec<ImageSource> {
        (1..=n)
            .map(|tag| ImageSource {
                url: format!("https://example.com/map_{tag}.png"),
                percentage_tag: tag,
            })
            .collect()
    }

    #[tokio::test]
    async fn twelve_sources_one_failure_end_to_end() {
        // 12 sources split into batches of 10 + 2; source 3 fails fetch.
        // Odd tags read Warszawa, even tags Kraków, all at the same
        // date/hour: two distinct natural keys among the 11 successes.
        let analyzer = MockAnalyzer {
            fail_url: Some("https://example.com/map_3.png".to_string()),
            city_for_tag: |tag| if tag % 2 == 1 { "Warszawa" } else { "Kraków" },
        };
        let store = MemoryStore::new();

        let summary = run_with_sources(&analyzer, &store, &sources(12), false)
            .await
            .unwrap();

        assert_eq!(summary.processed_images, 11);
        assert_eq!(summary.failed_images, 1);
        assert_eq!(summary.database_writes, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("map_3.png"));
        assert_eq!(store.record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn dry_run_skips_persistence_but_reports_writes() {
        let analyzer = MockAnalyzer {
            fail_url: None,
            city_for_tag: |_| "Warszawa",
        };
        let store = MemoryStore::new();

        let summary = run_with_sources(&analyzer, &store, &sources(4), true)
            .await
            .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.database_writes, 1);
        assert_eq!(store.record_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn all_failures_is_a_run_level_error() {
        let sources = sources(1);
        let analyzer = MockAnalyzer {
            fail_url: Some(sources[0].url.clone()),
            city_for_tag: |_| "Warszawa",
        };
        let store = MemoryStore::new();

        let result = run_with_sources(&analyzer, &store, &sources, false).await;
        assert!(matches!(result, Err(PipelineError::NoResults)));
    }

    /// Store whose upsert always fails, for exercising the run-level
    /// persistence error path.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl sun_map_storage::InsolationStore for BrokenStore {
        async fn upsert(
            &self,
            _records: &[sun_map_models::InsolationRecord],
        ) -> Result<u64, sun_map_storage::StorageError> {
            Err(sun_map_storage::StorageError::Backend {
                message: "connection refused".to_string(),
            })
        }

        async fn record_count(&self) -> Result<u64, sun_map_storage::StorageError> {
            Ok(0)
        }

        async fn latest_date(
            &self,
        ) -> Result<Option<NaiveDate>, sun_map_storage::StorageError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn failed_upsert_is_a_summary_error_not_a_crash() {
        let analyzer = MockAnalyzer {
            fail_url: None,
            city_for_tag: |_| "Warszawa",
        };

        let summary = run_with_sources(&analyzer, &BrokenStore, &sources(4), false)
            .await
            .unwrap();

        assert_eq!(summary.processed_images, 4);
        assert_eq!(summary.failed_images, 0);
        assert_eq!(summary.database_writes, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("storage upsert failed"));
        assert!(summary.errors[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn rerunning_leaves_storage_unchanged() {
        let analyzer = MockAnalyzer {
            fail_url: None,
            city_for_tag: |tag| if tag % 2 == 1 { "Warszawa" } else { "Kraków" },
        };
        let store = MemoryStore::new();

        let first = run_with_sources(&analyzer, &store, &sources(4), false)
            .await
            .unwrap();
        let count_after_first = store.record_count().await.unwrap();
        let mut snapshot = store.all().await;
        snapshot.sort_by(|a, b| a.natural_key().cmp(&b.natural_key()));

        let second = run_with_sources(&analyzer, &store, &sources(4), false)
            .await
            .unwrap();
        let mut resnapshot = store.all().await;
        resnapshot.sort_by(|a, b| a.natural_key().cmp(&b.natural_key()));

        assert_eq!(first.database_writes, second.database_writes);
        assert_eq!(store.record_count().await.unwrap(), count_after_first);
        assert_eq!(snapshot, resnapshot);
    }
}
