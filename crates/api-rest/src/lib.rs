//! # API REST
//!
//! REST API for MediMap.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON and multipart bodies, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `medimap-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod caller;
pub mod error;
pub mod hospitals;
pub mod triage;

use api_shared::HealthService;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use medimap_core::config::{
    caller_from_env_values, path_from_env_value, top_n_from_env_value, CoreConfig,
};
use medimap_core::constants::{DEFAULT_UPLOAD_DIR, MAX_UPLOAD_BYTES};
use medimap_core::{MediMapResult, MediMapService};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};

/// Default listen address when `MEDIMAP_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Application state shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: MediMapService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        triage::scenarios,
        triage::step,
        triage::back,
        triage::manual,
        hospitals::search,
        hospitals::recommend,
        hospitals::template,
        hospitals::upload,
        hospitals::stats,
        hospitals::facilities,
        hospitals::specialties,
        caller::caller_info,
        caller::triage_report,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorBody,
        api_shared::ErrorDetail,
        api_shared::ScenariosRes,
        api_shared::TriageStepReq,
        api_shared::TriageStepRes,
        api_shared::HistoryEntryDto,
        api_shared::NextQuestion,
        api_shared::ManualReq,
        api_shared::ManualRes,
        api_shared::HospitalSearchReq,
        api_shared::HospitalSearchRes,
        api_shared::HospitalDto,
        api_shared::HospitalHit,
        api_shared::RecommendReq,
        api_shared::RecommendRes,
        api_shared::RecommendedHospital,
        api_shared::TriageRequirementsDto,
        api_shared::UploadRes,
        api_shared::StatsRes,
        api_shared::FacilitiesRes,
        api_shared::SpecialtiesRes,
        api_shared::LatLng,
        api_shared::CallerInfoRes,
        api_shared::TriageReportReq,
        api_shared::TriageReportRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full router, including Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/triage/scenarios", get(triage::scenarios))
        .route("/api/triage/step", post(triage::step))
        .route("/api/triage/back", post(triage::back))
        .route("/api/triage/manual", post(triage::manual))
        .route("/api/hospitals/search", post(hospitals::search))
        .route("/api/hospitals/recommend", post(hospitals::recommend))
        .route("/api/hospitals/template", get(hospitals::template))
        .route(
            "/api/hospitals/upload",
            post(hospitals::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/hospitals/stats", get(hospitals::stats))
        .route("/api/hospitals/facilities", get(hospitals::facilities))
        .route("/api/hospitals/specialties", get(hospitals::specialties))
        .route("/api/caller-info", get(caller::caller_info))
        .route("/api/triage-report", post(caller::triage_report))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolves [`CoreConfig`] from the `MEDIMAP_*` environment variables.
///
/// Only binaries call this, once at startup.
pub fn config_from_env() -> MediMapResult<CoreConfig> {
    let var = |name: &str| std::env::var(name).ok();
    CoreConfig::new(
        path_from_env_value(var("MEDIMAP_SCENARIO_FILE")),
        path_from_env_value(var("MEDIMAP_HOSPITAL_DATA")),
        path_from_env_value(var("MEDIMAP_UPLOAD_DIR"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
        top_n_from_env_value(var("MEDIMAP_DEFAULT_TOP_N"))?,
        caller_from_env_values(
            var("MEDIMAP_CALLER_ID"),
            var("MEDIMAP_CALLER_LAT"),
            var("MEDIMAP_CALLER_LNG"),
        )?,
    )
}

/// Binds `addr` and serves the router until the process stops.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = api_shared::HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<api_shared::HealthRes> {
    Json(HealthService::check_health())
}
