mod assistant;
mod auth_handlers;
mod dashboard;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Routes anyone may call.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/api/ask-gemini-public", post(assistant::ask_public))
}

/// Routes that require a live bearer token. The caller layers the gate on.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route("/api/dashboard-data", get(dashboard::dashboard_data))
        .route("/api/ask-gemini", post(assistant::ask_admin))
}
