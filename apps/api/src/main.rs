mod analysis;
mod config;
mod errors;
mod jobs;
mod llm_client;
mod routes;
mod state;
mod stats;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::LlmResumeAnalyzer;
use crate::config::Config;
use crate::jobs::fetch::JobPageFetcher;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::stats::StatsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    if config.uses_default_admin_password() {
        warn!("ADMIN_PASSWORD is not set; the admin dashboard uses the default password");
    }

    // Initialize LLM client
    let llm = LlmClient::new(&config).context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm.model());

    // Job page fetcher shares one connection pool across requests
    let fetcher =
        JobPageFetcher::new(&config).context("Failed to build job page HTTP client")?;
    info!(
        "Job page fetcher initialized (timeout: {}s, hosts: {})",
        config.fetch_timeout_secs,
        if config.job_site_hosts.is_empty() {
            "any".to_string()
        } else {
            config.job_site_hosts.join(", ")
        }
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        analyzer: Arc::new(LlmResumeAnalyzer(llm)),
        fetcher,
        stats: Arc::new(StatsStore::new()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");
    info!("API endpoint: http://{addr}/api/analyze-resume");
    info!("Admin stats endpoint: http://{addr}/admin/stats");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
