use api_shared::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medimap_core::MediMapError;

/// Failure of a REST handler, rendered as the JSON error envelope.
#[derive(Debug)]
pub enum ApiError {
    Domain(MediMapError),
    CallerUnavailable,
    Multipart(String),
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl From<MediMapError> for ApiError {
    fn from(err: MediMapError) -> Self {
        ApiError::Domain(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(MediMapError::UnknownScenario(_)) => StatusCode::NOT_FOUND,
            ApiError::Domain(MediMapError::EmptyDirectory) => StatusCode::CONFLICT,
            ApiError::Domain(MediMapError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Domain(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::CallerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Domain(MediMapError::Io { .. }) => ErrorBody::new("io", "Internal error"),
            ApiError::Domain(err) => ErrorBody::from(err),
            ApiError::CallerUnavailable => {
                ErrorBody::new("caller_info_unavailable", "No caller information is available")
            }
            ApiError::Multipart(message) => ErrorBody::new("invalid_upload", message.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {:?}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
