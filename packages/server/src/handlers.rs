//! HTTP handler functions for the trigger API.

use std::time::Instant;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sun_map_models::RunSummary;
use sun_map_storage::InsolationStore as _;

use crate::AppState;

/// `GET /api/health` response body.
#[derive(Serialize)]
pub struct ApiHealth {
    /// Always `true` when the server can answer.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// Query parameters for `POST /api/pipeline/run`.
#[derive(Deserialize)]
pub struct RunParams {
    /// Run the full pipeline through reconciliation but skip the
    /// storage upsert.
    #[serde(default)]
    pub dry_run: bool,
}

/// `POST /api/pipeline/run` response body.
#[derive(Serialize)]
pub struct ApiRunResponse {
    /// Whether the run produced (or, dry, would have produced) writes.
    pub success: bool,
    /// Images successfully fetched and extracted.
    pub processed_images: u64,
    /// Images that failed after retries.
    pub failed_images: u64,
    /// Records written to storage (would-be count in a dry run).
    pub database_writes: u64,
    /// Per-image and run-level error descriptions.
    pub errors: Vec<String>,
    /// Wall-clock duration of the run.
    pub execution_time_ms: u64,
    /// RFC 3339 completion timestamp.
    pub timestamp: String,
    /// Whether persistence was skipped.
    pub dry_run: bool,
}

impl ApiRunResponse {
    fn from_summary(summary: RunSummary, started: Instant) -> Self {
        Self {
            success: summary.database_writes > 0,
            processed_images: summary.processed_images,
            failed_images: summary.failed_images,
            database_writes: summary.database_writes,
            errors: summary.errors,
            execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            timestamp: chrono::Utc::now().to_rfc3339(),
            dry_run: summary.dry_run,
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/pipeline/run`
///
/// Executes one full pipeline run. Handled outcomes — including runs
/// with partial per-image failures — answer HTTP 200; a run where
/// nothing could be extracted, or any other unhandled failure, answers
/// 500.
pub async fn run_pipeline(
    state: web::Data<AppState>,
    params: web::Query<RunParams>,
) -> HttpResponse {
    let started = Instant::now();

    match sun_map_pipeline::run(state.analyzer.as_ref(), state.store.as_ref(), params.dry_run)
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(ApiRunResponse::from_summary(summary, started)),
        Err(e) => {
            log::error!("Pipeline run failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
                "execution_time_ms": u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }
    }
}

/// `GET /api/stats`
///
/// Read-only storage statistics for the reporting surface.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let count = state.store.record_count().await;
    let latest = state.store.latest_date().await;

    match (count, latest) {
        (Ok(record_count), Ok(latest_date)) => HttpResponse::Ok().json(serde_json::json!({
            "record_count": record_count,
            "latest_date": latest_date,
        })),
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Failed to query storage stats: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to query storage stats"
            }))
        }
    }
}
