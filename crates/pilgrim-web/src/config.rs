use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pilgrim_core::llm::gemini;
use serde::Deserialize;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@pilgrimpath.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Argon2 PHC string. When set, `admin_password` is ignored.
    #[serde(default)]
    pub password_hash: String,
    /// Tokens never expire when unset.
    #[serde(default)]
    pub session_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            auth: AuthConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            password_hash: String::new(),
            session_ttl_seconds: None,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3001))
}

fn default_max_body_bytes() -> usize { 1024 * 1024 }
fn default_admin_email() -> String { DEFAULT_ADMIN_EMAIL.to_string() }
fn default_admin_password() -> String { DEFAULT_ADMIN_PASSWORD.to_string() }
fn default_model() -> String { gemini::DEFAULT_MODEL.to_string() }
fn default_base_url() -> String { gemini::DEFAULT_BASE_URL.to_string() }
fn default_timeout_seconds() -> u64 { gemini::DEFAULT_TIMEOUT.as_secs() }

impl AuthConfig {
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_seconds.map(Duration::from_secs)
    }

    pub fn uses_hashed_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServerConfig {
    /// Reads `PILGRIM_WEB_CONFIG` (if set), then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("PILGRIM_WEB_CONFIG").map(PathBuf::from).ok();
        Self::from_sources(config_path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds the config from an optional TOML file and an environment lookup.
    ///
    /// Fails when the file is unreadable or malformed, when an override does
    /// not parse, or when no API key is available.
    pub fn from_sources(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => ServerConfig::default(),
        };

        config.apply_env(env)?;
        config.validate()?;

        if !config.auth.uses_hashed_password()
            && config.auth.admin_password == DEFAULT_ADMIN_PASSWORD
        {
            tracing::warn!(
                "Using the built-in admin password. \
                 Set PILGRIM_PASSWORD_HASH (see `hash_password`) before exposing this server."
            );
        }

        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(addr) = env("PILGRIM_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }

        if let Some(email) = env("PILGRIM_ADMIN_EMAIL") {
            self.auth.admin_email = email;
        }
        if let Some(password) = env("PILGRIM_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
        if let Some(hash) = env("PILGRIM_PASSWORD_HASH") {
            self.auth.password_hash = hash;
        }
        if let Some(ttl) = env("PILGRIM_SESSION_TTL_SECONDS") {
            self.auth.session_ttl_seconds = Some(ttl.parse()?);
        }

        if let Some(key) = env(gemini::API_KEY_ENV) {
            self.gemini.api_key = key;
        }
        if let Some(model) = env("PILGRIM_GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(url) = env("PILGRIM_GEMINI_BASE_URL") {
            self.gemini.base_url = url;
        }
        if let Some(secs) = env("PILGRIM_GEMINI_TIMEOUT_SECONDS") {
            self.gemini.timeout_seconds = secs.parse()?;
        }

        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            anyhow::bail!(
                "{} environment variable not set. Please add it to your environment.",
                gemini::API_KEY_ENV
            );
        }
        if self.gemini.timeout_seconds == 0 {
            anyhow::bail!("gemini.timeout_seconds must be greater than zero");
        }
        Ok(())
    }
}
