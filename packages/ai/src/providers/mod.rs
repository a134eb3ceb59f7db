//! Vision provider abstraction and implementations.
//!
//! Supports Anthropic Claude and `OpenAI` via a common trait. Both
//! providers are configured for deterministic structured output: a
//! strict schema, temperature zero, and a hard per-call timeout.

pub mod anthropic;
pub mod openai;

use std::time::Duration;

use sun_map_models::EncodedImage;

use crate::ExtractError;

/// Hard per-call timeout for the extraction request.
///
/// Vision calls on a full map image routinely take tens of seconds;
/// anything past this is a hung connection, not a slow answer.
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait for vision-capable structured-extraction providers.
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Sends one image plus the extraction prompt and returns the
    /// provider's schema-constrained JSON output.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if the request fails or the provider
    /// answers without structured output.
    async fn extract_json(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<serde_json::Value, ExtractError>;
}

/// Creates a vision provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 2. `OPENAI_API_KEY` set -> `OpenAI`
///
/// # Errors
///
/// Returns [`ExtractError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn VisionProvider>, ExtractError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());

    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| ExtractError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| ExtractError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
            Ok(Box::new(openai::OpenAiProvider::new(api_key, model)))
        }
        other => Err(ExtractError::Config {
            message: format!("Unknown AI provider: {other}. Use 'anthropic' or 'openai'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> String {
    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set ANTHROPIC_API_KEY or OPENAI_API_KEY, \
         or set AI_PROVIDER explicitly."
    );

    // Fall back to anthropic — will produce a clear error about missing key
    "anthropic".to_string()
}
