#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web trigger API for the insolation pipeline.
//!
//! Each `POST /api/pipeline/run` call is one fresh, independent
//! pipeline run — the endpoint is safe to invoke repeatedly from an
//! external timer. Handled outcomes (including partial failures)
//! always answer HTTP 200 so the caller can tell "the pipeline ran
//! with problems" apart from "the pipeline crashed"; only unhandled
//! conditions produce a 500.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use sun_map_pipeline::ImageAnalyzer;
use sun_map_storage::InsolationStore;

/// Shared application state.
pub struct AppState {
    /// Storage collaborator receiving reconciled records.
    pub store: Arc<dyn InsolationStore>,
    /// The per-image fetch + extract operation.
    pub analyzer: Arc<dyn ImageAnalyzer>,
}

/// Starts the trigger API server.
///
/// This is a regular async function — the caller provides the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to
/// bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(
    store: Arc<dyn InsolationStore>,
    analyzer: Arc<dyn ImageAnalyzer>,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState { store, analyzer });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/stats", web::get().to(handlers::stats))
                    .route("/pipeline/run", web::post().to(handlers::run_pipeline)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
