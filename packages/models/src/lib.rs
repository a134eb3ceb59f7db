#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core data types shared across the insolation acquisition pipeline.
//!
//! Every stage of the pipeline — enumeration, fetching, vision
//! extraction, normalization, reconciliation, persistence — exchanges
//! the types defined here. All of them are scoped to a single run;
//! only [`InsolationRecord`] outlives the run, as the persisted row
//! format keyed by the natural key `(city, province, date, hour)`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One remotely hosted forecast-map image to fetch and analyze.
///
/// The full set is derived fresh each run from the fixed list of
/// forecast layers the upstream provider publishes; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Absolute URL of the forecast-map image.
    pub url: String,
    /// The forecast-layer percentage tag embedded in the URL.
    pub percentage_tag: u16,
}

/// A fetched image in transport-safe form.
///
/// Raw bytes are base64-encoded immediately after download so they can
/// be embedded in JSON request bodies to the vision endpoint without
/// further conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type reported by the image host (e.g. `image/png`).
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// A single city reading as emitted by the vision model.
///
/// Unvalidated: the name has not yet been resolved against the
/// gazetteer and the province may be missing or wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCityObservation {
    /// City name as read off the map image.
    pub name: String,
    /// Province as read off the map image, if visible.
    #[serde(default)]
    pub province: Option<String>,
    /// Insolation percentage in `0.0..=100.0`.
    pub insolation_percentage: f64,
}

/// The structured result of analyzing one forecast-map image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Calendar date the forecast applies to.
    pub capture_date: NaiveDate,
    /// Hour of day the forecast applies to, `0..=23`.
    pub capture_hour: u8,
    /// Per-city readings visible on the image.
    pub cities: Vec<RawCityObservation>,
}

/// A city observation resolved against the gazetteer.
///
/// `city` and `province` are canonical spellings; zero-valued readings
/// never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedObservation {
    /// Canonical city name.
    pub city: String,
    /// Canonical province name.
    pub province: String,
    /// Forecast date.
    pub date: NaiveDate,
    /// Forecast hour, `0..=23`.
    pub hour: u8,
    /// Insolation percentage in `0.0..=100.0`.
    pub insolation_percentage: f64,
}

/// The natural key identifying one insolation observation in storage.
pub type RecordKey = (String, String, NaiveDate, u8);

/// One reconciled, persistable insolation reading.
///
/// At most one record exists per natural key in storage at any time —
/// enforced by the store's conflict-replace upsert, not by any
/// application-level locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsolationRecord {
    /// Canonical city name.
    pub city: String,
    /// Canonical province name.
    pub province: String,
    /// Forecast date.
    pub date: NaiveDate,
    /// Forecast hour, `0..=23`.
    pub hour: u8,
    /// Averaged insolation percentage, rounded to two decimals.
    pub insolation_percentage: f64,
}

impl InsolationRecord {
    /// Returns the natural key `(city, province, date, hour)` for this
    /// record.
    #[must_use]
    pub fn natural_key(&self) -> RecordKey {
        (
            self.city.clone(),
            self.province.clone(),
            self.date,
            self.hour,
        )
    }
}

impl From<NormalizedObservation> for InsolationRecord {
    fn from(obs: NormalizedObservation) -> Self {
        Self {
            city: obs.city,
            province: obs.province,
            date: obs.date,
            hour: obs.hour,
            insolation_percentage: obs.insolation_percentage,
        }
    }
}

/// Summary of one pipeline invocation, returned to the caller.
///
/// Never persisted; the HTTP trigger wraps it with timing and a
/// timestamp before responding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Images successfully fetched and extracted.
    pub processed_images: u64,
    /// Images that failed fetch or extraction after retries.
    pub failed_images: u64,
    /// Reconciled records written to storage (or that would have been,
    /// in a dry run).
    pub database_writes: u64,
    /// Per-image and run-level error descriptions, in occurrence order.
    pub errors: Vec<String>,
    /// Whether the persistence step was skipped.
    pub dry_run: bool,
}
