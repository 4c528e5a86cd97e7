mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod reading;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::seeder::run_seed;
use crate::catalog::store::{CardStore, PgCardStore};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::reading::service::READING_TEMPERATURE;
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

    info!("Starting Fortune API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let cards: Arc<dyn CardStore> = Arc::new(PgCardStore::new(db));

    // Seed the catalog before accepting traffic; failures are logged, not fatal
    let cards_dir = Path::new(&config.cards_dir);
    run_seed(cards.as_ref(), cards_dir, &config.cards_public_path).await;

    // Initialize LLM client
    let llm = LlmClient::new(LlmSettings {
        api_key: config.openai_api_key.clone(),
        model: config.openai_model.clone(),
        base_url: config.openai_base_url.clone(),
        temperature: READING_TEMPERATURE,
    })?;
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        tracing::warn!("OPENAI_API_KEY is not set; readings will be refused");
    }

    let state = AppState { cards, llm };

    let app = build_router(state, cards_dir, &config.cards_public_path);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
