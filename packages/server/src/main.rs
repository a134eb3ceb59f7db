#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone trigger API server binary.
//!
//! Wires the production fetch + extract analyzer to the configured
//! vision provider and serves the trigger endpoints. Uses the
//! in-process store; deployments backed by the hosted relational
//! database inject their own [`sun_map_storage::InsolationStore`]
//! through [`sun_map_server::run_server`] instead.

use std::sync::Arc;

use sun_map_pipeline::FetchExtractAnalyzer;
use sun_map_storage::MemoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let provider = sun_map_ai::providers::create_provider_from_env()
        .expect("Failed to configure vision provider");

    sun_map_server::run_server(
        Arc::new(MemoryStore::new()),
        Arc::new(FetchExtractAnalyzer::new(provider)),
    )
    .await
}
