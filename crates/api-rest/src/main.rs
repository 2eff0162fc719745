//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without loading `.env`.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `medimap-run` binary serves the
//! same router after loading `.env` and logging the startup configuration.

use api_rest::{config_from_env, serve, AppState, DEFAULT_REST_ADDR};
use medimap_core::MediMapService;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MediMap REST API server
///
/// # Environment Variables
/// - `MEDIMAP_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDIMAP_SCENARIO_FILE`, `MEDIMAP_HOSPITAL_DATA`, `MEDIMAP_UPLOAD_DIR`,
///   `MEDIMAP_DEFAULT_TOP_N`, `MEDIMAP_CALLER_ID`, `MEDIMAP_CALLER_LAT`, `MEDIMAP_CALLER_LNG`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration, scenarios or initial hospital data are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medimap_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDIMAP_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting MediMap REST API on {}", addr);

    let cfg = Arc::new(config_from_env()?);
    let service = MediMapService::bootstrap(cfg)?;

    serve(&addr, AppState { service }).await
}
