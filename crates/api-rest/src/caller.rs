use crate::error::{ApiError, ApiResult};
use crate::AppState;
use api_shared::{CallerInfoRes, HospitalSearchRes, TriageReportReq, TriageReportRes};
use axum::extract::State;
use axum::Json;
use medimap_core::{MediMapError, TriageReport};

#[utoipa::path(
    get,
    path = "/api/caller-info",
    responses(
        (status = 200, description = "Current caller", body = CallerInfoRes),
        (status = 503, description = "No caller configured", body = api_shared::ErrorBody)
    )
)]
/// Report the current caller and location
#[axum::debug_handler]
pub async fn caller_info(State(state): State<AppState>) -> ApiResult<CallerInfoRes> {
    let caller = state
        .service
        .caller_source()
        .current()
        .ok_or(ApiError::CallerUnavailable)?;
    Ok(Json(CallerInfoRes::from(&caller)))
}

#[utoipa::path(
    post,
    path = "/api/triage-report",
    request_body = TriageReportReq,
    responses(
        (status = 200, description = "Report received", body = TriageReportRes),
        (status = 400, description = "Invalid report", body = api_shared::ErrorBody)
    )
)]
/// Receive a triage report and suggest capable hospitals
///
/// Suggested hospitals are the nearest ones whose level is at least the reported emergency
/// level. Without hospital data the report is still accepted, with no suggestions.
#[axum::debug_handler]
pub async fn triage_report(
    State(state): State<AppState>,
    Json(req): Json<TriageReportReq>,
) -> ApiResult<TriageReportRes> {
    let report = TriageReport::new(
        &req.caller_id,
        req.location.lat,
        req.location.lng,
        req.emergency_level,
    )?;
    tracing::info!(
        caller = report.caller_id.as_str(),
        level = report.emergency_level.get(),
        "triage report received"
    );

    let hospitals = match state.service.search(&report.hospital_query(), None) {
        Ok(result) => HospitalSearchRes::new(&result.hits, false).hospitals,
        Err(MediMapError::EmptyDirectory) => {
            tracing::warn!("triage report received before any hospital data was loaded");
            Vec::new()
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Json(TriageReportRes {
        status: "received".into(),
        received: req,
        hospitals,
    }))
}
