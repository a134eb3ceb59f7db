//! Resilient download of forecast-map images.
//!
//! The image host sits behind a WAF that rejects bare programmatic
//! requests, so every request carries a realistic browser header set.
//! Transient failures are retried with linear backoff; the caller gets
//! the last underlying error when all attempts are spent.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sun_map_models::EncodedImage;

use crate::FetchError;

/// Maximum number of attempts per image (first try included).
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts. The wait after the `n`th failed
/// attempt is `BASE_DELAY * n`, so 500ms, 1000ms — linear, which is
/// enough for a static image host that throttles rather than bans.
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Browser-like User-Agent; the host rejects default client agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Downloads forecast-map images and encodes them for transport.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Creates a fetcher with a shared HTTP client.
    ///
    /// No per-request timeout is configured; the transport default
    /// applies. Retry handles slow-host flakiness instead.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetches one image and returns it base64-encoded.
    ///
    /// Retries up to [`MAX_ATTEMPTS`] times on transport errors and
    /// non-success statuses, waiting `BASE_DELAY * attempt` between
    /// attempts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RetriesExhausted`] carrying the last
    /// underlying error once all attempts fail.
    pub async fn fetch(&self, url: &str) -> Result<EncodedImage, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                let delay = retry_delay(attempt);
                log::warn!("  retry {attempt}/{MAX_ATTEMPTS} for {url} in {delay:?}...");
                tokio::time::sleep(delay).await;
            }

            match self.attempt(url).await {
                Ok(image) => return Ok(image),
                Err(e) => {
                    log::warn!("fetch attempt {attempt}/{MAX_ATTEMPTS} failed for {url}: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: MAX_ATTEMPTS,
            last_error: last_error
                .map_or_else(|| "unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Performs a single GET with the spoofed browser header set.
    async fn attempt(&self, url: &str) -> Result<EncodedImage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "image/avif,image/webp,image/png,image/*;q=0.8")
            .header(reqwest::header::ACCEPT_LANGUAGE, "pl-PL,pl;q=0.9,en-US;q=0.7")
            .header(reqwest::header::REFERER, "https://mapy.solar-prognoza.pl/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| "image/png".to_string(), normalize_media_type);

        let bytes = response.bytes().await?;

        Ok(EncodedImage {
            media_type,
            data: STANDARD.encode(&bytes),
        })
    }
}

/// Returns the linear backoff wait before the given attempt: the
/// `n`th failed attempt is followed by `BASE_DELAY * n`.
fn retry_delay(attempt: u32) -> Duration {
    BASE_DELAY * (attempt - 1)
}

/// Strips charset and other parameters from a Content-Type header
/// value, keeping just the MIME type.
fn normalize_media_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or(value)
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear_in_failed_attempts() {
        assert_eq!(retry_delay(2), Duration::from_millis(500));
        assert_eq!(retry_delay(3), Duration::from_millis(1000));
    }

    #[test]
    fn strips_content_type_parameters() {
        assert_eq!(normalize_media_type("image/png; charset=binary"), "image/png");
        assert_eq!(normalize_media_type("IMAGE/JPEG"), "image/jpeg");
        assert_eq!(normalize_media_type("image/webp"), "image/webp");
    }
}
