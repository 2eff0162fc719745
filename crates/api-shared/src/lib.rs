//! # API Shared
//!
//! Wire types and shared services for the MediMap APIs.
//!
//! Contains:
//! - JSON request/response types with OpenAPI schemas (`triage`, `hospital`, `caller`)
//! - the error envelope returned on validation failures
//! - `HealthService`
//!
//! Conversions from `medimap-core` domain types live next to the wire types, so API crates
//! only map transport concerns (status codes, extractors).

pub mod caller;
pub mod error;
pub mod health;
pub mod hospital;
pub mod triage;

pub use caller::{CallerInfoRes, LatLng, TriageReportReq, TriageReportRes};
pub use error::{ErrorBody, ErrorDetail};
pub use health::{HealthRes, HealthService};
pub use hospital::{
    FacilitiesRes, HospitalDto, HospitalHit, HospitalSearchReq, HospitalSearchRes, RecommendReq,
    RecommendRes, RecommendedHospital, SpecialtiesRes, StatsRes, TriageRequirementsDto, UploadRes,
};
pub use triage::{
    HistoryEntryDto, ManualReq, ManualRes, NextQuestion, ScenariosRes, TriageStepReq,
    TriageStepRes,
};
