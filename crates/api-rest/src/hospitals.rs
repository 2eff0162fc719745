use crate::error::{ApiError, ApiResult};
use crate::AppState;
use api_shared::{
    FacilitiesRes, HospitalSearchReq, HospitalSearchRes, RecommendReq, RecommendRes,
    SpecialtiesRes, StatsRes, UploadRes,
};
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::Json;
use medimap_core::constants::MAX_TOP_N;
use medimap_core::hospital::{template_csv, TEMPLATE_FILE_NAME};
use medimap_core::{Level, MediMapError, MediMapResult, RecommendQuery, SearchQuery};

/// Multipart field carrying uploaded files.
const UPLOAD_FIELD: &str = "files";

fn query_from_request(req: &HospitalSearchReq) -> MediMapResult<SearchQuery> {
    let mut query = SearchQuery::new(req.latitude, req.longitude)?
        .with_facilities(req.facilities.clone())
        .with_specialties(req.specialties.clone());
    if !req.hospital_level.is_empty() {
        query = query.with_levels(req.hospital_level.iter().copied())?;
    }
    if let Some(km) = req.max_distance {
        query = query.with_max_distance(km)?;
    }
    check_top_n(req.top_n)?;
    Ok(query)
}

fn check_top_n(top_n: Option<usize>) -> MediMapResult<()> {
    match top_n {
        Some(top_n) if top_n > MAX_TOP_N => Err(MediMapError::InvalidInput(format!(
            "top_n must be at most {MAX_TOP_N}, got {top_n}"
        ))),
        _ => Ok(()),
    }
}

fn recommend_query(req: &RecommendReq) -> MediMapResult<RecommendQuery> {
    let severity = Level::new(req.severity).map_err(MediMapError::InvalidLevel)?;
    let mut query = RecommendQuery::new(req.latitude, req.longitude, severity)?
        .with_symptoms(req.symptoms.clone());
    if let Some(km) = req.max_distance {
        query = query.with_max_distance(km)?;
    }
    check_top_n(req.top_n)?;
    Ok(query)
}

#[utoipa::path(
    post,
    path = "/api/hospitals/search",
    request_body = HospitalSearchReq,
    responses(
        (status = 200, description = "Nearest matching hospitals", body = HospitalSearchRes),
        (status = 400, description = "Invalid coordinate, level or filter", body = api_shared::ErrorBody),
        (status = 409, description = "No hospital data loaded", body = api_shared::ErrorBody)
    )
)]
/// Find the nearest hospitals
///
/// With `widen_on_empty`, a search whose levels match nothing is retried once over every level
/// and the response is flagged `widened`.
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<HospitalSearchReq>,
) -> ApiResult<HospitalSearchRes> {
    let query = query_from_request(&req)?;
    let result = state.service.search(&query, req.top_n)?;

    if req.widen_on_empty && result.should_widen_levels() {
        tracing::info!(
            level_matches = result.level_matches,
            directory_size = result.directory_size,
            "no hospitals at requested levels; widening to all levels"
        );
        let widened = state.service.search(&query.widened(), req.top_n)?;
        return Ok(Json(HospitalSearchRes::new(&widened.hits, true)));
    }

    Ok(Json(HospitalSearchRes::new(&result.hits, false)))
}

#[utoipa::path(
    post,
    path = "/api/hospitals/recommend",
    request_body = RecommendReq,
    responses(
        (status = 200, description = "Hospitals ranked by priority for the caller's severity", body = RecommendRes),
        (status = 400, description = "Invalid coordinate, severity or radius", body = api_shared::ErrorBody),
        (status = 409, description = "No hospital data loaded", body = api_shared::ErrorBody)
    )
)]
/// Recommend hospitals for a triaged caller
///
/// Every hospital within `max_distance` is scored on distance, severity, care level, emergency
/// services and symptom fit, highest score first.
#[axum::debug_handler]
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendReq>,
) -> ApiResult<RecommendRes> {
    let query = recommend_query(&req)?;
    let recommendations = state.service.recommend(&query, req.top_n)?;
    Ok(Json(RecommendRes::new(query.severity(), &recommendations)))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/template",
    responses(
        (status = 200, description = "Sample CSV with every recognised column", content_type = "text/csv", body = String)
    )
)]
/// Download a hospital data template
#[axum::debug_handler]
pub async fn template(
    State(_state): State<AppState>,
) -> Result<([(HeaderName, String); 2], String), ApiError> {
    let body = template_csv()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/api/hospitals/upload",
    request_body(content_type = "multipart/form-data", description = "One or more CSV or JSON files in the `files` field"),
    responses(
        (status = 200, description = "Hospitals imported and published", body = UploadRes),
        (status = 400, description = "No valid hospital rows", body = UploadRes)
    )
)]
/// Upload hospital data
///
/// Accepted rows from every file are merged and published as one snapshot. Rejected rows and
/// files are listed in `errors`. When nothing is accepted the current snapshot is kept. Only
/// files that contributed accepted rows are kept in the upload directory.
#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Multipart(e.body_text()))?;
        files.push((file_name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::Multipart(format!(
            "no files provided in the '{UPLOAD_FIELD}' field"
        )));
    }

    let outcome = state
        .service
        .upload(files.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())));
    let errors = outcome.report.error_messages();

    let Some(snapshot) = outcome.snapshot else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(UploadRes {
                success: false,
                message: "No valid hospital data found in the uploaded files".into(),
                hospital_count: 0,
                errors,
            }),
        ));
    };

    let kept: Vec<(String, Vec<u8>)> = files
        .into_iter()
        .filter(|(name, _)| outcome.report.contributed(name))
        .collect();
    let service = state.service.clone();
    let stored = tokio::task::spawn_blocking(move || {
        for (name, bytes) in &kept {
            if let Err(err) = service.store_upload(name, bytes) {
                tracing::warn!("could not keep uploaded file {}: {}", name, err);
            }
        }
    })
    .await;
    if let Err(err) = stored {
        tracing::warn!("upload storage task failed: {}", err);
    }

    let mut message = format!("Successfully processed {} hospitals", snapshot.len());
    if !errors.is_empty() {
        message.push_str(&format!(" ({} errors encountered)", errors.len()));
    }
    Ok((
        StatusCode::OK,
        Json(UploadRes {
            success: true,
            message,
            hospital_count: snapshot.len(),
            errors,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/stats",
    responses(
        (status = 200, description = "Directory summary", body = StatsRes),
        (status = 409, description = "No hospital data loaded", body = api_shared::ErrorBody)
    )
)]
/// Summarise the hospital directory
#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> ApiResult<StatsRes> {
    let stats = state.service.directory().stats()?;
    Ok(Json(StatsRes::from(&stats)))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/facilities",
    responses(
        (status = 200, description = "Distinct facilities", body = FacilitiesRes),
        (status = 409, description = "No hospital data loaded", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn facilities(State(state): State<AppState>) -> ApiResult<FacilitiesRes> {
    Ok(Json(FacilitiesRes {
        facilities: state.service.directory().facilities()?,
    }))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/specialties",
    responses(
        (status = 200, description = "Distinct specialties", body = SpecialtiesRes),
        (status = 409, description = "No hospital data loaded", body = api_shared::ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn specialties(State(state): State<AppState>) -> ApiResult<SpecialtiesRes> {
    Ok(Json(SpecialtiesRes {
        specialties: state.service.directory().specialties()?,
    }))
}
