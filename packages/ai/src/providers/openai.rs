//! `OpenAI` GPT provider implementation.
//!
//! Structured output uses the `response_format: json_schema` mode, so
//! the completion content is guaranteed to be schema-conformant JSON.

use serde::{Deserialize, Serialize};
use sun_map_models::EncodedImage;

use super::{EXTRACTION_TIMEOUT, VisionProvider};
use crate::ExtractError;
use crate::prompt;

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
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

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl VisionProvider for OpenAiProvider {
    async fn extract_json(
        &self,
        prompt_text: &str,
        image: &EncodedImage,
    ) -> Result<serde_json::Value, ExtractError> {
        let data_url = format!("data:{};base64,{}", image.media_type, image.data);

        let messages = vec![serde_json::json!({
            "role": "user",
            "content": [
                { "type": "text", "text": prompt_text },
                { "type": "image_url", "image_url": { "url": data_url } },
            ],
        })];

        let request = OpenAiRequest {
            model: &self.model,
            messages,
            max_tokens: 4096,
            temperature: 0.0,
            response_format: serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "map_reading",
                    "schema": prompt::output_schema(),
                },
            }),
        };

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: OpenAiError = serde_json::from_str(&body).unwrap_or_else(|_| OpenAiError {
                error: OpenAiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(ExtractError::Provider {
                message: err.error.message,
            });
        }

        let response: OpenAiResponse = serde_json::from_str(&body)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractError::Provider {
                message: "response contained no completion content".to_string(),
            })?;

        Ok(serde_json::from_str(&content)?)
    }
}
