use crate::error::ApiResult;
use crate::AppState;
use api_shared::{ManualReq, ManualRes, ScenariosRes, TriageStepReq, TriageStepRes};
use axum::extract::State;
use axum::Json;
use medimap_core::triage::manual_level;

#[utoipa::path(
    get,
    path = "/api/triage/scenarios",
    responses(
        (status = 200, description = "Scenario ids in definition order", body = ScenariosRes)
    )
)]
/// List triage scenarios
#[axum::debug_handler]
pub async fn scenarios(State(state): State<AppState>) -> Json<ScenariosRes> {
    Json(ScenariosRes {
        scenarios: state
            .service
            .triage()
            .scenarios()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

#[utoipa::path(
    post,
    path = "/api/triage/step",
    request_body = TriageStepReq,
    responses(
        (status = 200, description = "Next question or final level", body = TriageStepRes),
        (status = 400, description = "Invalid answer", body = api_shared::ErrorBody),
        (status = 404, description = "Unknown scenario", body = api_shared::ErrorBody)
    )
)]
/// Replay a session's answers and return where it stands
///
/// The session is held by the client: every call carries the full answer path from the root.
#[axum::debug_handler]
pub async fn step(
    State(state): State<AppState>,
    Json(req): Json<TriageStepReq>,
) -> ApiResult<TriageStepRes> {
    let step = state.service.triage().step(&req.scenario_id, req.answers.as_slice())?;
    Ok(Json(TriageStepRes::from_step(&req.scenario_id, &step)))
}

#[utoipa::path(
    post,
    path = "/api/triage/back",
    request_body = TriageStepReq,
    responses(
        (status = 200, description = "State with the last answer removed", body = TriageStepRes),
        (status = 400, description = "Invalid answer", body = api_shared::ErrorBody),
        (status = 404, description = "Unknown scenario", body = api_shared::ErrorBody)
    )
)]
/// Step back one question
#[axum::debug_handler]
pub async fn back(
    State(state): State<AppState>,
    Json(req): Json<TriageStepReq>,
) -> ApiResult<TriageStepRes> {
    let step = state.service.triage().rewind(&req.scenario_id, req.answers.as_slice())?;
    Ok(Json(TriageStepRes::from_step(&req.scenario_id, &step)))
}

#[utoipa::path(
    post,
    path = "/api/triage/manual",
    request_body = ManualReq,
    responses(
        (status = 200, description = "Level assigned", body = ManualRes),
        (status = 400, description = "Level out of range", body = api_shared::ErrorBody)
    )
)]
/// Assign a severity level directly
#[axum::debug_handler]
pub async fn manual(
    State(_state): State<AppState>,
    Json(req): Json<ManualReq>,
) -> ApiResult<ManualRes> {
    let level = manual_level(req.level)?;
    Ok(Json(ManualRes::from(level)))
}
