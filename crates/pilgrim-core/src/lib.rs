//! PilgrimPath core library — transport-agnostic backend logic.
//!
//! `pilgrim-core` holds everything the HTTP server and the direct command-line
//! client share, so neither has to know how the other reaches the model.
//!
//! # Modules
//!
//! - [`persona`] — Fixed system instructions for the admin analyst and the public pilgrim guide.
//! - [`llm`] — The [`LlmClient`] capability and its Gemini implementation.
//! - [`gateway`] — [`Gateway`]: prompt validation, one upstream attempt, uniform failure policy.
//! - [`metrics`] — Randomized [`DashboardSnapshot`] generation for the admin dashboard.
//! - [`error`] — Error types ([`LlmError`], [`GatewayError`]).

pub mod error;
pub mod gateway;
pub mod llm;
pub mod metrics;
pub mod persona;

pub use error::{GatewayError, LlmError};
pub use gateway::{Caller, Gateway, FALLBACK_REPLY};
pub use llm::gemini::GeminiClient;
pub use llm::{GenerateRequest, LlmClient};
pub use metrics::{ChangeType, DashboardSnapshot, MetricsProvider, MockMetrics};
pub use persona::Persona;
