//! Construction of the structured-extraction prompt.
//!
//! The prompt embeds the full gazetteer so the model can emit exact
//! canonical spellings instead of guessing at Polish diacritics, plus
//! the current date so relative labels on the map ("jutro", "dziś")
//! resolve to the right calendar date.

use chrono::NaiveDate;

/// Builds the extraction instruction for one forecast-map image.
///
/// `today` anchors the model's date reasoning to the real-world
/// calendar at the time of the run.
#[must_use]
pub fn build_prompt(today: NaiveDate) -> String {
    let cities = sun_map_gazetteer::CITIES
        .iter()
        .map(|&(city, _)| city)
        .collect::<Vec<_>>()
        .join(", ");
    let provinces = sun_map_gazetteer::provinces().join(", ");

    format!(
        "You are reading a solar insolation forecast map of Poland. \
         Today's date is {today}.\n\
         \n\
         Known cities (use these exact spellings): {cities}\n\
         Known provinces: {provinces}\n\
         \n\
         Extract every insolation reading visible on the image and \
         report it through the output schema. Rules:\n\
         - Only include cities that are actually labelled on this image.\n\
         - Omit any city whose reading is exactly 0.\n\
         - Use the exact canonical city spelling from the list above.\n\
         - Report the forecast hour as an integer 0-23.\n\
         - Report the forecast date as an ISO date (YYYY-MM-DD), \
           resolving relative labels against today's date.\n\
         - insolationPercentage is a number between 0 and 100.\n\
         - If a city's province is visible or known, include it; \
           otherwise leave it out."
    )
}

/// The strict JSON schema the provider must conform its output to.
#[must_use]
pub fn output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "date": {
                "type": "string",
                "description": "Forecast date, ISO format YYYY-MM-DD",
            },
            "hour": {
                "type": "integer",
                "minimum": 0,
                "maximum": 23,
                "description": "Forecast hour of day",
            },
            "cities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "province": { "type": "string" },
                        "insolationPercentage": {
                            "type": "number",
                            "minimum": 0,
                            "maximum": 100,
                        },
                    },
                    "required": ["name", "insolationPercentage"],
                },
            },
        },
        "required": ["date", "hour", "cities"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_gazetteer_and_date() {
        let prompt = build_prompt(chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert!(prompt.contains("2025-01-15"));
        assert!(prompt.contains("Warszawa"));
        assert!(prompt.contains("Gorzów Wielkopolski"));
        assert!(prompt.contains("Mazowieckie"));
        assert!(prompt.contains("exactly 0"));
    }

    #[test]
    fn schema_requires_all_top_level_fields() {
        let schema = output_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect();
        assert_eq!(required, vec!["date", "hour", "cities"]);
    }
}
