use std::sync::Arc;

use pilgrim_core::{Gateway, GeminiClient, MetricsProvider, MockMetrics};

use crate::auth::credentials::{self, CredentialVerifier};
use crate::auth::session::{MemorySessionStore, SessionStore};
use crate::config::ServerConfig;

/// Everything a handler can reach. Cloned per request; all heavy members are
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub gateway: Gateway,
    pub metrics: Arc<dyn MetricsProvider>,
}

impl AppState {
    /// Wires the production collaborators described by `config`.
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let client = GeminiClient::new(
            config.gemini.api_key.clone(),
            config.gemini.base_url.clone(),
            config.gemini.timeout(),
        )?;
        let gateway = Gateway::new(Arc::new(client), config.gemini.model.clone());
        let credentials = credentials::from_config(&config.auth)?;
        let sessions = Arc::new(MemorySessionStore::new(config.auth.session_ttl()));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            credentials,
            gateway,
            metrics: Arc::new(MockMetrics),
        })
    }
}
