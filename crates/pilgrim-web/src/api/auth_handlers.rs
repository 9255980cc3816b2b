use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::middleware::bearer_token;
use crate::dto::{parse_body, LoginRequest, LoginResponse, MessageResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let body: LoginRequest = parse_body(&body)?;

    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let verifier = state.credentials.clone();
    let attempted = email.clone();
    let valid = tokio::task::spawn_blocking(move || verifier.verify(&email, &password))
        .await
        .context("Credential check task failed")?;

    if !valid {
        tracing::warn!("Failed login attempt for: {attempted}");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.sessions.issue();
    tracing::info!("Admin logged in, token issued.");

    Ok(Json(LoginResponse {
        message: "Admin login successful".to_string(),
        token,
    }))
}

/// Revokes the presented token. Runs behind the bearer gate, so the token is
/// known to be live.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
        tracing::info!("Admin logged out, token revoked.");
    }
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}
