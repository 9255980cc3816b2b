use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;

/// Issues and checks opaque bearer tokens.
///
/// A token carries no identity: holding any live token authorizes every
/// protected route.
pub trait SessionStore: Send + Sync {
    /// Creates, records and returns a new token.
    fn issue(&self) -> String;

    /// `true` if `token` was issued here and is neither revoked nor expired.
    fn validate(&self, token: &str) -> bool;

    /// Forgets `token`. Returns whether it was present.
    fn revoke(&self, token: &str) -> bool;

    fn cleanup_expired(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails closed: no candidate means no access.
    fn authenticate(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|token| self.validate(token))
    }
}

/// Process-local token registry. Lost on restart.
pub struct MemorySessionStore {
    tokens: DashMap<String, Instant>,
    ttl: Option<Duration>,
}

impl MemorySessionStore {
    /// `ttl` of `None` keeps tokens until revoked or the process exits.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    fn is_live(&self, issued_at: Instant) -> bool {
        self.ttl.map_or(true, |ttl| issued_at.elapsed() < ttl)
    }
}

/// 32 random bytes, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

impl SessionStore for MemorySessionStore {
    fn issue(&self) -> String {
        let token = generate_token();
        self.tokens.insert(token.clone(), Instant::now());
        tracing::debug!("Session store size: {}", self.tokens.len());
        token
    }

    fn validate(&self, token: &str) -> bool {
        let Some(entry) = self.tokens.get(token) else {
            return false;
        };
        if self.is_live(*entry) {
            return true;
        }
        drop(entry);
        tracing::debug!("Token expired");
        self.tokens.remove(token);
        false
    }

    fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    fn cleanup_expired(&self) {
        if self.ttl.is_none() {
            return;
        }
        let before = self.tokens.len();
        self.tokens.retain(|_, issued_at| self.is_live(*issued_at));
        let removed = before.saturating_sub(self.tokens.len());
        if removed > 0 {
            tracing::debug!("Swept {removed} expired tokens");
        }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}
