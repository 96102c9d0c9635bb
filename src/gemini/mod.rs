//! Generative API Layer
//!
//! Text and image+text generation behind two narrow traits, with a Gemini
//! `generateContent` implementation in [`client`].

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::API_KEY_ENV;

pub use client::GeminiClient;

/// Errors from a generative API call
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Gemini API key is not configured (set {})", API_KEY_ENV)]
    MissingApiKey,
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Gemini response contained no text")]
    EmptyResponse,
}

/// Prompt → text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError>;
}

/// Image + prompt → text generation
#[async_trait]
pub trait VisionGenerator: Send + Sync {
    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, GeminiError>;
}
