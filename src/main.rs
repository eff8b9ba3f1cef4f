//! LLM Agent Proxy - Main entry point
//!
//! Loads configuration from the environment, then serves the chat API.

use anyhow::{Context, Result};
use chrono::Local;
use llm_agent_proxy::{build_router, core::init_metrics, AppConfig, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(threads) = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
    {
        builder.worker_threads(threads);
    }

    let runtime = builder.enable_all().build()?;
    runtime.block_on(async_main())
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

fn init_tracing() {
    let no_color = std::env::var("NO_COLOR").is_ok();

    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,llm_agent_proxy=debug".to_string());

    // Always suppress noisy HTTP library logs regardless of RUST_LOG setting
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn",
        base_filter
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    tracing::info!(
        credentials = ?config.credentials,
        request_timeout_secs = config.request_timeout_secs,
        agent_max_steps = config.agent_max_steps,
        "Configuration loaded"
    );

    let listener = config.server.bind().await.with_context(|| {
        format!(
            "Failed to bind {}:{}",
            config.server.host, config.server.port
        )
    })?;
    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state);

    tracing::info!("Starting LLM Agent Proxy on {}", listener.local_addr()?);
    tracing::info!("Chat API: POST /chat");
    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Metrics endpoint: /metrics");

    axum::serve(listener, app).await?;

    Ok(())
}
