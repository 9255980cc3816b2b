//! Error types for `pilgrim-core`.
//!
//! [`LlmError`] describes what went wrong talking to the model provider and is
//! only ever logged. [`GatewayError`] is what callers see: it never carries
//! upstream text.

/// Failure while calling the external generative-language service.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON shape we expect.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// The response decoded but held no text parts.
    #[error("upstream response contained no text")]
    EmptyResponse,
}

/// Outcome of a [`Gateway`](crate::Gateway) call that did not produce text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The caller supplied no prompt, or an empty one.
    #[error("Prompt is required")]
    MissingPrompt,

    /// The upstream call failed. Details are in the server log only.
    #[error("Error contacting the Gemini API.")]
    Upstream,
}
