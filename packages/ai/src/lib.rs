#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Vision-model extraction of insolation readings from forecast maps.
//!
//! One image goes in with a structured-extraction prompt; a typed
//! [`ExtractionResult`](sun_map_models::ExtractionResult) comes out.
//! Providers (Anthropic Claude, `OpenAI`) are abstracted behind the
//! [`providers::VisionProvider`] trait; both are driven at temperature
//! zero with a strict output schema so the response is machine-parsed,
//! never free-text-scraped. Extraction is still best-effort — the
//! reconciler's cross-image averaging is what makes the data
//! trustworthy.

pub mod prompt;
pub mod providers;

use chrono::NaiveDate;
use serde::Deserialize;
use sun_map_models::{EncodedImage, ExtractionResult, RawCityObservation};
use thiserror::Error;

use providers::VisionProvider;

/// Errors that can occur during vision extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP request to the vision provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider's output did not match the required schema.
    #[error("Schema validation failed: {message}")]
    Schema {
        /// Description of the violation.
        message: String,
    },

    /// The provider returned a well-formed result with no cities.
    ///
    /// An empty read is never treated as a successful extraction.
    #[error("Extraction produced no city readings")]
    Empty,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Wire shape of the provider's structured output.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    date: String,
    hour: i64,
    cities: Vec<WireCity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCity {
    name: String,
    #[serde(default)]
    province: Option<String>,
    insolation_percentage: f64,
}

/// Analyzes forecast-map images through a vision provider.
pub struct Extractor {
    provider: Box<dyn VisionProvider>,
}

impl Extractor {
    /// Creates an extractor around the given provider.
    #[must_use]
    pub fn new(provider: Box<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Analyzes one image and returns its typed extraction result.
    ///
    /// The prompt is rebuilt per call so the embedded date context is
    /// always current.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] on transport failure, schema-invalid
    /// provider output, or an empty city list.
    pub async fn analyze(&self, image: &EncodedImage) -> Result<ExtractionResult, ExtractError> {
        let prompt = prompt::build_prompt(chrono::Local::now().date_naive());
        let value = self.provider.extract_json(&prompt, image).await?;
        validate(&value)
    }
}

/// Validates the provider's raw JSON against the required shape.
///
/// # Errors
///
/// Returns [`ExtractError::Schema`] on any shape or range violation
/// and [`ExtractError::Empty`] when the city list is empty.
pub fn validate(value: &serde_json::Value) -> Result<ExtractionResult, ExtractError> {
    let wire: WireResult =
        serde_json::from_value(value.clone()).map_err(|e| ExtractError::Schema {
            message: format!("malformed extraction output: {e}"),
        })?;

    let capture_date =
        NaiveDate::parse_from_str(&wire.date, "%Y-%m-%d").map_err(|e| ExtractError::Schema {
            message: format!("invalid date {:?}: {e}", wire.date),
        })?;

    let capture_hour = u8::try_from(wire.hour)
        .ok()
        .filter(|h| *h <= 23)
        .ok_or_else(|| ExtractError::Schema {
            message: format!("hour {} out of range 0..=23", wire.hour),
        })?;

    if wire.cities.is_empty() {
        return Err(ExtractError::Empty);
    }

    let mut cities = Vec::with_capacity(wire.cities.len());
    for city in wire.cities {
        if !(0.0..=100.0).contains(&city.insolation_percentage) {
            return Err(ExtractError::Schema {
                message: format!(
                    "insolation {} for {:?} out of range 0..=100",
                    city.insolation_percentage, city.name
                ),
            });
        }
        cities.push(RawCityObservation {
            name: city.name,
            province: city.province,
            insolation_percentage: city.insolation_percentage,
        });
    }

    Ok(ExtractionResult {
        capture_date,
        capture_hour,
        cities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_well_formed_output() {
        let value = json!({
            "date": "2025-01-01",
            "hour": 12,
            "cities": [
                { "name": "Warszawa", "province": "Mazowieckie", "insolationPercentage": 40.0 },
                { "name": "Kraków", "insolationPercentage": 55.5 },
            ],
        });
        let result = validate(&value).unwrap();
        assert_eq!(result.capture_hour, 12);
        assert_eq!(result.cities.len(), 2);
        assert_eq!(result.cities[1].province, None);
    }

    #[test]
    fn rejects_empty_city_list() {
        let value = json!({ "date": "2025-01-01", "hour": 12, "cities": [] });
        assert!(matches!(validate(&value), Err(ExtractError::Empty)));
    }

    #[test]
    fn rejects_out_of_range_hour() {
        let value = json!({
            "date": "2025-01-01",
            "hour": 24,
            "cities": [{ "name": "Warszawa", "insolationPercentage": 40.0 }],
        });
        assert!(matches!(validate(&value), Err(ExtractError::Schema { .. })));
    }

    #[test]
    fn rejects_out_of_range_percentage() {
        let value = json!({
            "date": "2025-01-01",
            "hour": 12,
            "cities": [{ "name": "Warszawa", "insolationPercentage": 140.0 }],
        });
        assert!(matches!(validate(&value), Err(ExtractError::Schema { .. })));
    }

    #[test]
    fn rejects_unparseable_date() {
        let value = json!({
            "date": "01.01.2025",
            "hour": 12,
            "cities": [{ "name": "Warszawa", "insolationPercentage": 40.0 }],
        });
        assert!(matches!(validate(&value), Err(ExtractError::Schema { .. })));
    }

    #[test]
    fn rejects_missing_fields() {
        let value = json!({ "hour": 12 });
        assert!(matches!(validate(&value), Err(ExtractError::Schema { .. })));
    }
}
