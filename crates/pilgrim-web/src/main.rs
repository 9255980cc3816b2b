mod api;
mod app;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pilgrim_web=debug,pilgrim_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let session_ttl = config.auth.session_ttl();

    let state = AppState::from_config(config)?;

    // Expired-token sweep. Without a TTL nothing ever expires.
    if let Some(ttl) = session_ttl {
        tracing::info!("Session tokens expire after {}s", ttl.as_secs());
        let sweep_store = state.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                sweep_store.cleanup_expired();
            }
        });
    }

    let model = state.gateway.model().to_string();
    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("PilgrimPath backend listening on http://{bind_addr} (model: {model})");
    axum::serve(listener, app).await?;

    Ok(())
}
