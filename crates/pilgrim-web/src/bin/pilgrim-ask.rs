//! Asks the pilgrim guide a question straight from the terminal,
//! without going through the backend.

use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use pilgrim_core::llm::gemini::{self, GeminiClient};
use pilgrim_core::{Gateway, Persona};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pilgrim-ask")]
#[command(about = "Ask the PilgrimPath guide directly", version)]
struct Cli {
    /// Question to ask. Read from stdin when omitted.
    prompt: Vec<String>,

    /// Gemini model name
    #[arg(long, default_value = gemini::DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, default_value = gemini::DEFAULT_BASE_URL)]
    base_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = gemini::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

/// The API key is required up front; a blank value counts as missing.
fn api_key_from(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    env(gemini::API_KEY_ENV)
        .filter(|k| !k.trim().is_empty())
        .with_context(|| {
            format!(
                "{} is not defined. Cannot initialize Gemini client.",
                gemini::API_KEY_ENV
            )
        })
}

fn timeout_from(seconds: u64) -> anyhow::Result<Duration> {
    if seconds == 0 {
        bail!("--timeout must be greater than zero");
    }
    Ok(Duration::from_secs(seconds))
}

/// Joins the positional words, or falls back to `stdin` when there are none.
fn resolve_prompt(words: &[String], stdin: impl Read) -> anyhow::Result<String> {
    let prompt = if words.is_empty() {
        let mut buf = String::new();
        let mut stdin = stdin;
        stdin.read_to_string(&mut buf)?;
        buf.trim().to_string()
    } else {
        words.join(" ").trim().to_string()
    };

    if prompt.is_empty() {
        bail!("Prompt is required");
    }
    Ok(prompt)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pilgrim_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let api_key = api_key_from(|key| std::env::var(key).ok())?;
    let timeout = timeout_from(cli.timeout)?;
    let prompt = resolve_prompt(&cli.prompt, io::stdin())?;

    let client = GeminiClient::new(api_key, cli.base_url, timeout)?;
    let gateway = Gateway::new(Arc::new(client), cli.model);

    let reply = gateway
        .ask_or_fallback(&prompt, Persona::DirectGuide)
        .await?;
    println!("{reply}");
    Ok(())
}
