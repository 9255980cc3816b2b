//! The single admin identity and how a login attempt is checked against it.

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};

use crate::config::AuthConfig;

/// Decides whether an email/password pair is the admin.
///
/// Implementations are synchronous and may be CPU heavy; handlers call them
/// from `spawn_blocking`.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, email: &str, password: &str) -> bool;
}

/// Admin password kept in plain text in the config.
pub struct PlainCredential {
    email: String,
    password: String,
}

impl PlainCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl CredentialVerifier for PlainCredential {
    fn verify(&self, email: &str, password: &str) -> bool {
        let email_ok = constant_time_eq(email.as_bytes(), self.email.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        email_ok & password_ok
    }
}

/// Admin password stored as an argon2 PHC string.
pub struct HashedCredential {
    email: String,
    password_hash: String,
}

impl HashedCredential {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> anyhow::Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash: {e}"))?;
        Ok(Self {
            email: email.into(),
            password_hash,
        })
    }
}

impl CredentialVerifier for HashedCredential {
    fn verify(&self, email: &str, password: &str) -> bool {
        if !constant_time_eq(email.as_bytes(), self.email.as_bytes()) {
            return false;
        }
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("Stored password hash no longer parses: {e}");
                false
            }
        }
    }
}

/// Picks the verifier the config asks for.
pub fn from_config(auth: &AuthConfig) -> anyhow::Result<Arc<dyn CredentialVerifier>> {
    if auth.uses_hashed_password() {
        tracing::info!("Admin password: argon2 hash");
        Ok(Arc::new(HashedCredential::new(
            auth.admin_email.clone(),
            auth.password_hash.clone(),
        )?))
    } else {
        tracing::info!("Admin password: plain text from config");
        Ok(Arc::new(PlainCredential::new(
            auth.admin_email.clone(),
            auth.admin_password.clone(),
        )))
    }
}

#[cfg(test)]
fn hash_password(password: &str) -> anyhow::Result<String> {
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Constant-time byte comparison so response timing does not leak how much
/// of a credential matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
