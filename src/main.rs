use api_rest::{AppState, DEFAULT_REST_ADDR, config_from_env, serve};
use medimap_core::MediMapService;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MediMap application
///
/// Loads `.env`, resolves configuration once, loads the triage scenarios and any initial
/// hospital data, then serves the REST API with Swagger UI.
///
/// # Environment Variables
/// - `MEDIMAP_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDIMAP_SCENARIO_FILE`: YAML scenario definitions replacing the built-in set
/// - `MEDIMAP_HOSPITAL_DATA`: CSV or JSON hospital data published at startup
/// - `MEDIMAP_UPLOAD_DIR`: Where accepted uploads are kept (default: "uploads")
/// - `MEDIMAP_DEFAULT_TOP_N`: Results per search when the request does not say (default: 5)
/// - `MEDIMAP_CALLER_ID`, `MEDIMAP_CALLER_LAT`, `MEDIMAP_CALLER_LNG`: Static caller info
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medimap_run=info".parse()?)
                .add_directive("medimap_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MEDIMAP_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(config_from_env()?);
    let service = MediMapService::bootstrap(cfg.clone())?;

    tracing::info!(
        scenarios = service.triage().forest().len(),
        hospital_data = ?cfg.hospital_data(),
        caller_configured = cfg.caller().is_some(),
        "++ MediMap configured"
    );
    tracing::info!("++ Starting MediMap REST on {}", rest_addr);

    serve(&rest_addr, AppState { service }).await
}
