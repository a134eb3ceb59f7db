#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forecast-map image sources and the resilient HTTP fetcher.
//!
//! The upstream provider publishes one insolation forecast map per
//! percentage layer at predictable URLs. [`registry`] enumerates the
//! fixed layer set for a run; [`fetch`] downloads each image with
//! retry and encodes it for transport to the vision endpoint.

pub mod fetch;
pub mod registry;

use thiserror::Error;

/// Errors that can occur while fetching a forecast-map image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP transport failed (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The requested URL.
        url: String,
        /// The response status code.
        status: reqwest::StatusCode,
    },

    /// All retry attempts were exhausted.
    #[error("fetch of {url} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// The requested URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Description of the final underlying error.
        last_error: String,
    },
}
