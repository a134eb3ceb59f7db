//! Enumeration of the fixed forecast-map image set.
//!
//! The upstream provider publishes one map image per insolation
//! percentage layer. The layer set is sparse and non-contiguous —
//! it tracks which layers the provider actually renders, not a
//! regular grid — so it is kept as an explicit list rather than a
//! range.

use sun_map_models::ImageSource;

/// Percentage tags of the forecast layers the provider publishes.
///
/// Update this list only when the provider adds or removes a layer;
/// everything downstream derives from it.
pub const PERCENTAGE_TAGS: &[u16] = &[10, 20, 30, 45, 60, 75, 90, 100];

/// Base URL of the forecast-map image host.
pub const IMAGE_BASE_URL: &str = "https://mapy.solar-prognoza.pl/naslonecznienie";

/// Returns the full list of forecast-map images to fetch for a run.
///
/// Pure and deterministic: no inputs, no I/O, same output every call.
#[must_use]
pub fn list_sources() -> Vec<ImageSource> {
    PERCENTAGE_TAGS
        .iter()
        .map(|&tag| ImageSource {
            url: format!("{IMAGE_BASE_URL}_{tag}.png"),
            percentage_tag: tag,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_one_source_per_tag() {
        let sources = list_sources();
        assert_eq!(sources.len(), PERCENTAGE_TAGS.len());
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(list_sources(), list_sources());
    }

    #[test]
    fn urls_embed_their_tag() {
        for source in list_sources() {
            assert!(
                source.url.ends_with(&format!("_{}.png", source.percentage_tag)),
                "unexpected url: {}",
                source.url
            );
        }
    }

    #[test]
    fn tags_are_strictly_increasing() {
        assert!(PERCENTAGE_TAGS.windows(2).all(|w| w[0] < w[1]));
    }
}
