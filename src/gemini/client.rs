//! Gemini REST client
//!
//! Calls `models/{model}:generateContent` with either a single text part or
//! an inline image followed by a text part.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{GeminiError, TextGenerator, VisionGenerator};
use crate::config::GeminiConfig;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn text_request(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart::Text { text: prompt }],
        }],
    }
}

fn vision_request<'a>(image: &[u8], mime_type: &'a str, prompt: &'a str) -> GenerateContentRequest<'a> {
    let data = base64::engine::general_purpose::STANDARD.encode(image);

    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![
                RequestPart::InlineData {
                    inline_data: InlineData { mime_type, data },
                },
                RequestPart::Text { text: prompt },
            ],
        }],
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client; fails when no API key is configured
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: generate_url(&config.endpoint, &config.model),
            api_key,
            model: config.model.clone(),
        })
    }

    async fn generate(&self, body: &GenerateContentRequest<'_>) -> Result<String, GeminiError> {
        debug!("Gemini request: model={}, url={}", self.model, self.url);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text().ok_or(GeminiError::EmptyResponse)?;

        info!("Gemini responded with {} chars", text.chars().count());
        Ok(text)
    }
}

fn generate_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate(&text_request(prompt)).await
    }
}

#[async_trait]
impl VisionGenerator for GeminiClient {
    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, GeminiError> {
        self.generate(&vision_request(image, mime_type, prompt)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
