//! The canonical city and alias tables.
//!
//! [`CITIES`] is the closed gazetteer: the only cities the pipeline
//! recognizes, each with its canonical voivodeship. [`ALIASES`] maps
//! spellings the vision model is known to produce — ASCII-folded
//! diacritics, English exonyms, abbreviated compound names — back to
//! the canonical form.

/// Canonical city name → voivodeship, for every city the forecast
/// maps label.
pub const CITIES: &[(&str, &str)] = &[
    ("Warszawa", "Mazowieckie"),
    ("Kraków", "Małopolskie"),
    ("Łódź", "Łódzkie"),
    ("Wrocław", "Dolnośląskie"),
    ("Poznań", "Wielkopolskie"),
    ("Gdańsk", "Pomorskie"),
    ("Szczecin", "Zachodniopomorskie"),
    ("Bydgoszcz", "Kujawsko-Pomorskie"),
    ("Lublin", "Lubelskie"),
    ("Białystok", "Podlaskie"),
    ("Katowice", "Śląskie"),
    ("Gdynia", "Pomorskie"),
    ("Częstochowa", "Śląskie"),
    ("Radom", "Mazowieckie"),
    ("Toruń", "Kujawsko-Pomorskie"),
    ("Rzeszów", "Podkarpackie"),
    ("Kielce", "Świętokrzyskie"),
    ("Olsztyn", "Warmińsko-Mazurskie"),
    ("Bielsko-Biała", "Śląskie"),
    ("Zielona Góra", "Lubuskie"),
    ("Gorzów Wielkopolski", "Lubuskie"),
    ("Opole", "Opolskie"),
    ("Płock", "Mazowieckie"),
    ("Elbląg", "Warmińsko-Mazurskie"),
    ("Koszalin", "Zachodniopomorskie"),
    ("Suwałki", "Podlaskie"),
    ("Słupsk", "Pomorskie"),
    ("Zakopane", "Małopolskie"),
];

/// Known non-canonical spellings → canonical city name.
///
/// Grown from observed model output; keep entries lowercase so lookup
/// can be case-insensitive.
pub const ALIASES: &[(&str, &str)] = &[
    // English exonyms
    ("warsaw", "Warszawa"),
    ("cracow", "Kraków"),
    // ASCII-folded diacritics
    ("krakow", "Kraków"),
    ("lodz", "Łódź"),
    ("wroclaw", "Wrocław"),
    ("poznan", "Poznań"),
    ("gdansk", "Gdańsk"),
    ("torun", "Toruń"),
    ("rzeszow", "Rzeszów"),
    ("bialystok", "Białystok"),
    ("czestochowa", "Częstochowa"),
    ("plock", "Płock"),
    ("elblag", "Elbląg"),
    ("suwalki", "Suwałki"),
    ("slupsk", "Słupsk"),
    ("zielona gora", "Zielona Góra"),
    // Abbreviated compound names
    ("gorzów wlkp.", "Gorzów Wielkopolski"),
    ("gorzów wlkp", "Gorzów Wielkopolski"),
    ("gorzów", "Gorzów Wielkopolski"),
    ("bielsko", "Bielsko-Biała"),
];

/// Returns the distinct voivodeship list, in gazetteer order.
#[must_use]
pub fn provinces() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for &(_, province) in CITIES {
        if !seen.contains(&province) {
            seen.push(province);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_gazetteer_cities() {
        for &(alias, canonical) in ALIASES {
            assert!(
                CITIES.iter().any(|&(city, _)| city == canonical),
                "alias {alias:?} points at unknown city {canonical:?}"
            );
        }
    }

    #[test]
    fn alias_keys_are_lowercase() {
        for &(alias, _) in ALIASES {
            assert_eq!(alias, alias.to_lowercase());
        }
    }

    #[test]
    fn provinces_are_distinct() {
        let provinces = provinces();
        let mut deduped = provinces.clone();
        deduped.dedup();
        assert_eq!(provinces, deduped);
        assert!(provinces.contains(&"Mazowieckie"));
    }
}
