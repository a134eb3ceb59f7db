//! Fixed-size batch orchestration of fetch + extract operations.
//!
//! Batches run strictly one after another; images within a batch run
//! concurrently and all settle before the batch is considered done, so
//! one bad image never cancels or blocks its siblings. The inter-batch
//! delay is the pipeline's rate-limit courtesy toward the vision
//! endpoint.

use std::time::{Duration, Instant};

use futures::future::join_all;
use sun_map_models::{ExtractionResult, ImageSource};

use crate::ImageAnalyzer;

/// Number of images analyzed concurrently within one batch. This is
/// the sole concurrency bound — there is no global semaphore.
pub const BATCH_SIZE: usize = 10;

/// Delay between consecutive batches (not applied after the last).
pub const BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Runs every source through the analyzer in sequential batches of
/// [`BATCH_SIZE`], collecting successes and per-image failures.
///
/// Failures are reported as `"{url}: {error}"` strings. Each task
/// settles into its own slot; results are merged only after the whole
/// batch completes, so no list is mutated concurrently.
pub async fn run_batches(
    analyzer: &dyn ImageAnalyzer,
    sources: &[ImageSource],
) -> (Vec<ExtractionResult>, Vec<String>) {
    let total = sources.len();
    let batch_count = total.div_ceil(BATCH_SIZE);
    let start = Instant::now();

    let mut results = Vec::new();
    let mut errors = Vec::new();

    for (batch_index, batch) in sources.chunks(BATCH_SIZE).enumerate() {
        log::info!(
            "Batch {}/{batch_count}: analyzing {} images",
            batch_index + 1,
            batch.len()
        );

        let settled = join_all(batch.iter().map(|source| async move {
            (source, analyzer.analyze_source(source).await)
        }))
        .await;

        for (source, outcome) in settled {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!("image {} failed: {e}", source.url);
                    errors.push(format!("{}: {e}", source.url));
                }
            }
        }

        let processed = results.len() + errors.len();
        let elapsed = start.elapsed();
        let remaining = if processed > 0 {
            elapsed.mul_f64((total - processed) as f64 / processed as f64)
        } else {
            Duration::ZERO
        };
        log::info!(
            "Progress: {processed}/{total} images, {} ok, {} failed, \
             elapsed {:.1}s, ~{:.1}s remaining",
            results.len(),
            errors.len(),
            elapsed.as_secs_f64(),
            remaining.as_secs_f64()
        );

        if batch_index + 1 < batch_count {
            tokio::time::sleep(BATCH_DELAY).await;
        }
    }

    (results, errors)
}
