use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use pilgrim_core::{Caller, Persona};

use crate::dto::{parse_body, PromptRequest, TextResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Admin analyst. Mounted behind the bearer gate.
pub async fn ask_admin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TextResponse>, AppError> {
    ask(&state, &body, Persona::AdminAnalyst, Caller::Admin).await
}

/// Public pilgrim guide. No authentication.
pub async fn ask_public(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TextResponse>, AppError> {
    ask(&state, &body, Persona::PilgrimGuide, Caller::Public).await
}

async fn ask(
    state: &AppState,
    body: &[u8],
    persona: Persona,
    caller: Caller,
) -> Result<Json<TextResponse>, AppError> {
    let body: PromptRequest = parse_body(body)?;
    let text = state
        .gateway
        .ask(body.prompt.as_deref(), persona, caller)
        .await?;
    Ok(Json(TextResponse { text }))
}
