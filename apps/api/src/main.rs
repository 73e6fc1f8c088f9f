mod config;
mod controller;
mod errors;
mod extract;
mod markdown;
mod render;
mod rewrite;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::controller::OptimizationController;
use crate::rewrite::OpenAiRewriteClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tailor-api v{}", env!("CARGO_PKG_VERSION"));

    // Rewrite client construction validates the credential up front; a bad
    // deployment fails here, never inside a user's request.
    let rewriter = Arc::new(OpenAiRewriteClient::new(
        config.openai_api_url.clone(),
        config.openai_api_key.clone(),
    )?);
    info!("Rewrite client initialized (model: {})", rewrite::MODEL);

    let state = AppState {
        rewriter,
        controller: Arc::new(Mutex::new(OptimizationController::new())),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
