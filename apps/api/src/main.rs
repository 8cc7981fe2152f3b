mod analysis;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod rate_limit;
mod resumes;
mod routes;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::keywords::FrequencyKeywordExtractor;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::AtlasClient;
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Curator API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = AtlasClient::new(
        config.atlas_api_key.clone(),
        config.atlas_base_url.clone(),
        config.atlas_model.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    // Rate limiter and keyword extractor are plain values owned here and
    // injected through AppState.
    let limiter = Arc::new(RateLimiter::new());
    let keywords = Arc::new(FrequencyKeywordExtractor);

    let state = AppState {
        db,
        llm,
        limiter,
        keywords,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins for production deploys

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
