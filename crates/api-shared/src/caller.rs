use crate::hospital::HospitalHit;
use medimap_core::CallerInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CallerInfoRes {
    pub caller_id: String,
    pub location: LatLng,
}

impl From<&CallerInfo> for CallerInfoRes {
    fn from(caller: &CallerInfo) -> Self {
        Self {
            caller_id: caller.caller_id.as_str().to_string(),
            location: LatLng {
                lat: caller.location.lat(),
                lng: caller.location.lng(),
            },
        }
    }
}

/// Emergency report from a caller. `emergency_level` is 1 (non-urgent) to 4 (critical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageReportReq {
    pub caller_id: String,
    pub location: LatLng,
    pub emergency_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageReportRes {
    pub status: String,
    pub received: TriageReportReq,
    /// Nearest hospitals at or above the emergency level.
    pub hospitals: Vec<HospitalHit>,
}
