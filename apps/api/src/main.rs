mod config;
mod errors;
mod gemini_client;
mod generation;
mod layout;
mod models;
mod routes;
mod state;
mod story;
mod typeset;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Comicsmith API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(config.clone());
    if state.gemini.is_some() {
        info!(
            "Gemini client initialized (text: {}, image: {})",
            config.gemini_text_model, config.gemini_image_model
        );
    } else {
        warn!("GEMINI_API_KEY not set; requests must send the {} header", state::API_KEY_HEADER);
    }
    info!(
        "Generation pacing: {}ms between panels, {}ms retry base, max {} panels",
        config.panel_delay_ms, config.retry_delay_ms, config.max_panels
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
