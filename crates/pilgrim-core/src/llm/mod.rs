//! The model-provider capability.
//!
//! [`LlmClient`] is the seam between the [`Gateway`](crate::Gateway) policy and
//! a concrete provider. Production uses [`gemini::GeminiClient`]; tests plug in
//! their own implementations.

pub mod gemini;

use async_trait::async_trait;

use crate::error::LlmError;

/// One non-streaming text completion request.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub system_instruction: &'a str,
    pub prompt: &'a str,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `request` once and returns the completion text.
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError>;
}
