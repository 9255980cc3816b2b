use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

/// Token from an `Authorization: Bearer <token>` header, if there is one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Gate for protected routes: 401 without a token, 403 with one the session
/// store does not know. The inner handler only runs on success.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let candidate = bearer_token(req.headers());
    if candidate.is_none() {
        return Err(AppError::Unauthorized(
            "Access denied. No token provided.".to_string(),
        ));
    }
    if !state.sessions.authenticate(candidate) {
        tracing::warn!("Rejected request with unknown token: {} {}", req.method(), req.uri());
        return Err(AppError::Forbidden("Access denied. Invalid token.".to_string()));
    }

    Ok(next.run(req).await)
}
