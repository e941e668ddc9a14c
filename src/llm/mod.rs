//! Vision language model clients.
//!
//! The analyzer talks to the model through the [`VisionModel`] trait so the
//! external service can be swapped (or doubled in tests). The production
//! implementation is [`GeminiClient`].

mod config;
mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use config::LlmConfig;
pub use gemini::GeminiClient;

/// Errors from vision model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// A binary document sent alongside the prompt.
#[derive(Debug, Clone, Copy)]
pub struct InlineDocument<'a> {
    /// Media type declared by the uploader (e.g. "image/png").
    pub media_type: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> InlineDocument<'a> {
    pub fn new(media_type: &'a str, bytes: &'a [u8]) -> Self {
        Self { media_type, bytes }
    }
}

/// A generative model that accepts a prompt plus an optional document.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Whether the model can be called at all (credential present).
    fn is_available(&self) -> bool;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Send one request and return the model's raw text reply.
    async fn generate(
        &self,
        prompt: &str,
        document: Option<InlineDocument<'_>>,
    ) -> Result<String, LlmError>;
}
