//! Anthropic Claude provider implementation.
//!
//! Structured output is obtained by forcing a tool call whose input
//! schema is the extraction schema — the model has no way to answer
//! except with schema-conformant JSON.

use serde::{Deserialize, Serialize};
use sun_map_models::EncodedImage;

use super::{EXTRACTION_TIMEOUT, VisionProvider};
use crate::ExtractError;
use crate::prompt;

/// Name of the forced extraction tool.
const TOOL_NAME: &str = "record_map_reading";

/// Anthropic Claude API provider.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed, which only
    /// happens when the TLS backend fails to initialize.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::builder()
                .timeout(EXTRACTION_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

/// Anthropic API request body.
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<serde_json::Value>,
    tools: Vec<serde_json::Value>,
    tool_choice: serde_json::Value,
}

/// Anthropic API response body.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        #[allow(dead_code)]
        text: String,
    },
    ToolUse {
        input: serde_json::Value,
    },
}

/// Anthropic API error response.
#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl VisionProvider for AnthropicProvider {
    async fn extract_json(
        &self,
        prompt_text: &str,
        image: &EncodedImage,
    ) -> Result<serde_json::Value, ExtractError> {
        let messages = vec![serde_json::json!({
            "role": "user",
            "content": [
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.media_type,
                        "data": image.data,
                    },
                },
                { "type": "text", "text": prompt_text },
            ],
        })];

        let tools = vec![serde_json::json!({
            "name": TOOL_NAME,
            "description": "Records the insolation readings extracted from a forecast map",
            "input_schema": prompt::output_schema(),
        })];

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: 4096,
            temperature: 0.0,
            messages,
            tools,
            tool_choice: serde_json::json!({ "type": "tool", "name": TOOL_NAME }),
        };

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: AnthropicError =
                serde_json::from_str(&body).unwrap_or_else(|_| AnthropicError {
                    error: AnthropicErrorDetail {
                        message: format!("HTTP {status}: {body}"),
                    },
                });
            return Err(ExtractError::Provider {
                message: err.error.message,
            });
        }

        let response: AnthropicResponse = serde_json::from_str(&body)?;

        response
            .content
            .into_iter()
            .find_map(|block| match block {
                AnthropicContentBlock::ToolUse { input } => Some(input),
                AnthropicContentBlock::Text { .. } => None,
            })
            .ok_or_else(|| ExtractError::Provider {
                message: "response contained no tool_use block".to_string(),
            })
    }
}
