#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical city gazetteer and observation normalization.
//!
//! The vision model reads city labels off low-resolution map images,
//! so its output needs fuzzy resolution against the closed gazetteer
//! before anything is persisted. Matching is progressively looser:
//! exact, then case-insensitive, then substring in either direction,
//! then a fixed alias table of known misreadings. A name that survives
//! none of these is dropped with a warning — an unrecognized label is
//! expected noise, not a failure.

pub mod cities;

use chrono::NaiveDate;
use sun_map_models::{NormalizedObservation, RawCityObservation};

pub use cities::{ALIASES, CITIES, provinces};

/// Resolves a free-text city name against the gazetteer.
///
/// Returns the canonical `(city, province)` pair, or `None` when no
/// matching rule applies. First match wins, in order: exact,
/// case-insensitive, substring either direction, alias table.
#[must_use]
pub fn resolve(name: &str) -> Option<(&'static str, &'static str)> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Exact
    if let Some(&entry) = CITIES.iter().find(|&&(city, _)| city == trimmed) {
        return Some(entry);
    }

    let lower = trimmed.to_lowercase();

    // Case-insensitive
    if let Some(&entry) = CITIES
        .iter()
        .find(|&&(city, _)| city.to_lowercase() == lower)
    {
        return Some(entry);
    }

    // Substring either direction, e.g. "Gdańsk Główny" or a truncated
    // label. Needs at least 4 characters to avoid absurd matches.
    if lower.chars().count() >= 4
        && let Some(&entry) = CITIES.iter().find(|&&(city, _)| {
            let canonical = city.to_lowercase();
            canonical.contains(&lower) || lower.contains(&canonical)
        })
    {
        return Some(entry);
    }

    // Alias table of known misreadings
    if let Some(&(_, canonical)) = ALIASES.iter().find(|&&(alias, _)| alias == lower) {
        return CITIES.iter().find(|&&(city, _)| city == canonical).copied();
    }

    None
}

/// Normalizes one raw observation into its canonical, persistable
/// form.
///
/// Returns `None` when the city cannot be resolved (logged as a
/// warning) or the reading is exactly zero. The province supplied by
/// the extractor is preferred when present; otherwise the gazetteer's
/// canonical assignment is used.
#[must_use]
pub fn normalize(
    raw: &RawCityObservation,
    date: NaiveDate,
    hour: u8,
) -> Option<NormalizedObservation> {
    let Some((city, canonical_province)) = resolve(&raw.name) else {
        log::warn!("unrecognized city {:?}, dropping observation", raw.name);
        return None;
    };

    if raw.insolation_percentage == 0.0 {
        return None;
    }

    let province = raw
        .province
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map_or_else(|| canonical_province.to_string(), ToString::to_string);

    Some(NormalizedObservation {
        city: city.to_string(),
        province,
        date,
        hour,
        insolation_percentage: raw.insolation_percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, pct: f64) -> RawCityObservation {
        RawCityObservation {
            name: name.to_string(),
            province: None,
            insolation_percentage: pct,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn resolves_exact() {
        assert_eq!(resolve("Warszawa"), Some(("Warszawa", "Mazowieckie")));
    }

    #[test]
    fn resolves_case_insensitive() {
        assert_eq!(resolve("warszawa"), Some(("Warszawa", "Mazowieckie")));
        assert_eq!(resolve("KRAKÓW"), Some(("Kraków", "Małopolskie")));
    }

    #[test]
    fn resolves_substring_both_directions() {
        // Raw label longer than canonical
        assert_eq!(resolve("Gdańsk Główny"), Some(("Gdańsk", "Pomorskie")));
        // Raw label is a prefix of canonical
        assert_eq!(
            resolve("Częstoch"),
            Some(("Częstochowa", "Śląskie"))
        );
    }

    #[test]
    fn resolves_aliases() {
        assert_eq!(resolve("Warsaw"), Some(("Warszawa", "Mazowieckie")));
        assert_eq!(resolve("Lodz"), Some(("Łódź", "Łódzkie")));
        assert_eq!(
            resolve("Gorzów Wlkp."),
            Some(("Gorzów Wielkopolski", "Lubuskie"))
        );
    }

    #[test]
    fn unknown_city_is_dropped() {
        assert_eq!(resolve("Nonexistentville"), None);
        assert_eq!(resolve(""), None);
        assert!(normalize(&raw("Nonexistentville", 50.0), date(), 12).is_none());
    }

    #[test]
    fn short_fragments_do_not_substring_match() {
        assert_eq!(resolve("ra"), None);
    }

    #[test]
    fn zero_reading_is_dropped() {
        assert!(normalize(&raw("Warszawa", 0.0), date(), 12).is_none());
    }

    #[test]
    fn prefers_extractor_supplied_province() {
        let observation = RawCityObservation {
            name: "Radom".to_string(),
            province: Some("Mazowieckie".to_string()),
            insolation_percentage: 42.0,
        };
        let normalized = normalize(&observation, date(), 9).unwrap();
        assert_eq!(normalized.city, "Radom");
        assert_eq!(normalized.province, "Mazowieckie");
        assert_eq!(normalized.hour, 9);
    }

    #[test]
    fn falls_back_to_canonical_province() {
        let normalized = normalize(&raw("gdynia", 17.5), date(), 8).unwrap();
        assert_eq!(normalized.province, "Pomorskie");
    }
}
