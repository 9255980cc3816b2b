//! One policy for every prompt that leaves the process.
//!
//! The [`Gateway`] validates the prompt, makes exactly one upstream attempt with
//! the persona's instruction, and turns any upstream failure into
//! [`GatewayError::Upstream`] after logging the real cause.

use std::fmt;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::llm::{GenerateRequest, LlmClient};
use crate::persona::Persona;

/// Reply used by the direct client when the model cannot be reached.
pub const FALLBACK_REPLY: &str =
    "Sorry, I am having trouble connecting to my knowledge base. Please try again later.";

/// Where a gateway call originates. Only used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Authenticated admin route.
    Admin,
    /// Unauthenticated public route.
    Public,
    /// Command-line client talking to the model without the backend.
    Direct,
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Caller::Admin => "admin",
            Caller::Public => "public",
            Caller::Direct => "direct",
        })
    }
}

#[derive(Clone)]
pub struct Gateway {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl Gateway {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks the model `prompt` in the voice of `persona`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MissingPrompt`] if `prompt` is absent or empty. No
    ///   upstream call is made.
    /// - [`GatewayError::Upstream`] if the upstream call fails for any reason.
    pub async fn ask(
        &self,
        prompt: Option<&str>,
        persona: Persona,
        caller: Caller,
    ) -> Result<String, GatewayError> {
        let prompt = match prompt {
            Some(p) if !p.is_empty() => p,
            _ => return Err(GatewayError::MissingPrompt),
        };

        tracing::info!(%caller, %persona, model = %self.model, "Asking Gemini: {prompt:?}");

        let request = GenerateRequest {
            model: &self.model,
            system_instruction: persona.system_instruction(),
            prompt,
        };

        self.client.generate(&request).await.map_err(|e| {
            tracing::error!(%caller, %persona, "Error calling Gemini API: {e}");
            GatewayError::Upstream
        })
    }

    /// Like [`Gateway::ask`], but an upstream failure becomes [`FALLBACK_REPLY`].
    ///
    /// # Errors
    ///
    /// [`GatewayError::MissingPrompt`] if `prompt` is empty. That is the
    /// caller's mistake, not a connectivity problem, so it is not masked.
    pub async fn ask_or_fallback(
        &self,
        prompt: &str,
        persona: Persona,
    ) -> Result<String, GatewayError> {
        match self.ask(Some(prompt), persona, Caller::Direct).await {
            Err(GatewayError::Upstream) => Ok(FALLBACK_REPLY.to_string()),
            other => other,
        }
    }
}
