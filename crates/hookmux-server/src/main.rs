//! # hookmux server
//!
//! Webhook callback server built on the hookmux dispatch router.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default settings
//! hookmux
//!
//! # Run with a specific config file
//! HOOKMUX_CONFIG=/path/to/hookmux.toml hookmux
//!
//! # Run with environment variables
//! HOOKMUX_PORT=8080 HOOKMUX_HOST=0.0.0.0 hookmux
//! ```

mod config;
mod handlers;
mod metrics;

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hookmux=debug,hookmux_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::load()?;

    tracing::info!("Starting hookmux on {}:{}", config.host, config.port);

    // Initialize metrics
    metrics::init_metrics();

    let state = Arc::new(handlers::AppState::new(config));
    tracing::info!(routes = ?state.router.stats(), "Routing table ready");

    handlers::run_server(state).await?;

    Ok(())
}
