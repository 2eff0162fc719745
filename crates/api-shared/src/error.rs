use medimap_core::MediMapError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope: `{"success": false, "error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable machine-readable kind, e.g. `invalid_level`.
    pub kind: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}

impl From<&MediMapError> for ErrorBody {
    fn from(err: &MediMapError) -> Self {
        Self::new(err.kind().as_str(), err.to_string())
    }
}
