mod config;
mod errors;
mod llm_client;
mod outreach;
mod provider;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::outreach::discovery::DiscoverySettings;
use crate::outreach::scoring::{ScoringTables, ScoringWeights};
use crate::provider::SnovClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EazyApply API v{}", env!("CARGO_PKG_VERSION"));

    // Scoring tables (embedded unless SCORING_TABLES_PATH overrides them)
    let tables = ScoringTables::load(config.scoring_tables_path.as_deref())?;
    info!(
        "Scoring tables loaded ({})",
        config
            .scoring_tables_path
            .as_deref()
            .unwrap_or("built-in")
    );

    // Initialize contact provider
    let credentials = config.snov_credentials();
    if credentials.is_none() {
        warn!("SNOV_CLIENT_ID/SNOV_CLIENT_SECRET not set; requests must carry an access token");
    }
    let provider = SnovClient::new(&config.snov_api_base, credentials)
        .context("Failed to build contact provider client")?;
    info!("Contact provider client initialized ({})", config.snov_api_base);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        provider: Arc::new(provider),
        llm,
        discovery: DiscoverySettings {
            domain_poll: config.domain_poll,
            prospect_poll: config.discovery_poll,
            max_contacts: config.max_contacts,
            tables: Arc::new(tables),
            weights: ScoringWeights::default(),
        },
        resolution_poll: config.resolution_poll,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the web front end's origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
