//! # MediMap Core
//!
//! Domain logic for emergency triage and hospital proximity search:
//! - scenario decision trees and the stateless triage engine
//! - hospital import from CSV/JSON uploads and the published directory snapshot
//! - haversine ranking with level, facility, specialty and radius filters
//! - severity-weighted hospital recommendation
//! - caller info and triage report validation
//!
//! **No API concerns**: HTTP handlers and wire types belong in `api-rest` and `api-shared`.

pub mod caller;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod hospital;
pub mod service;
pub mod triage;

pub use caller::{CallerInfo, CallerInfoSource, StaticCallerInfo, TriageReport};
pub use config::CoreConfig;
pub use error::{ErrorKind, MediMapError, MediMapResult};
pub use hospital::{
    DirectorySnapshot, DirectoryStats, HospitalDirectory, HospitalRecord, ImportReport,
    RecommendQuery, Recommendation, Recommendations, RowError, SearchHit, SearchQuery,
    SearchResult, TriageRequirements,
};
pub use medimap_types::{Coordinate, Level, NonEmptyText, TypesError};
pub use service::{MediMapService, UploadOutcome};
pub use triage::{HistoryEntry, ScenarioForest, TriageEngine, TriageStep};
