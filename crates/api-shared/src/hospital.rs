use medimap_core::hospital::level_description;
use medimap_core::triage::severity_label;
use medimap_core::{
    DirectoryStats, HospitalRecord, Level, Recommendation, Recommendations, SearchHit,
    TriageRequirements,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Search request. An empty `hospital_level` list means every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalSearchReq {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub hospital_level: Vec<i64>,
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Search radius in kilometres.
    #[serde(default)]
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Retry with every level when the requested levels match nothing.
    #[serde(default)]
    pub widen_on_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalDto {
    pub id: String,
    pub name: String,
    pub level: u8,
    pub level_description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub phone: Option<String>,
    pub area: Option<String>,
    pub availability: Option<String>,
    pub state: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub facilities: Vec<String>,
    pub specialties: Vec<String>,
    pub emergency_services: bool,
    pub bed_count: Option<u32>,
}

impl From<&HospitalRecord> for HospitalDto {
    fn from(r: &HospitalRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.as_str().to_string(),
            level: r.level.get(),
            level_description: level_description(r.level).to_string(),
            latitude: r.location.lat(),
            longitude: r.location.lng(),
            address: r.address.clone(),
            phone: r.phone.clone(),
            area: r.area.clone(),
            availability: r.availability.clone(),
            state: r.state.clone(),
            email: r.email.clone(),
            website: r.website.clone(),
            facilities: r.facilities.clone(),
            specialties: r.specialties.clone(),
            emergency_services: r.emergency_services,
            bed_count: r.bed_count,
        }
    }
}

/// A hospital with its distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalHit {
    #[serde(flatten)]
    pub hospital: HospitalDto,
    pub distance_km: f64,
    pub travel_time_minutes: u32,
}

impl From<&SearchHit> for HospitalHit {
    fn from(hit: &SearchHit) -> Self {
        Self {
            hospital: HospitalDto::from(&hit.hospital),
            distance_km: hit.distance_km,
            travel_time_minutes: hit.travel_time_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalSearchRes {
    pub success: bool,
    pub hospitals: Vec<HospitalHit>,
    pub count: usize,
    /// True when the levels filter was dropped to find any result.
    pub widened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HospitalSearchRes {
    pub fn new(hits: &[SearchHit], widened: bool) -> Self {
        let hospitals: Vec<HospitalHit> = hits.iter().map(HospitalHit::from).collect();
        Self {
            success: true,
            count: hospitals.len(),
            hospitals,
            widened,
            error: None,
        }
    }
}

/// Recommendation request. `severity` is the caller's triage level, 1 to 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendReq {
    pub latitude: f64,
    pub longitude: f64,
    pub severity: i64,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Search radius in kilometres (default 50).
    #[serde(default)]
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageRequirementsDto {
    pub preferred_facilities: Vec<String>,
    pub preferred_specialties: Vec<String>,
    pub emergency_services: bool,
}

impl From<&TriageRequirements> for TriageRequirementsDto {
    fn from(r: &TriageRequirements) -> Self {
        Self {
            preferred_facilities: r.preferred_facilities.clone(),
            preferred_specialties: r.preferred_specialties.clone(),
            emergency_services: r.prefers_emergency_services,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendedHospital {
    #[serde(flatten)]
    pub hospital: HospitalDto,
    pub distance_km: f64,
    pub travel_time_minutes: u32,
    pub priority_score: f64,
    pub recommendation_reason: String,
}

impl From<&Recommendation> for RecommendedHospital {
    fn from(r: &Recommendation) -> Self {
        Self {
            hospital: HospitalDto::from(&r.hospital),
            distance_km: r.distance_km,
            travel_time_minutes: r.travel_time_minutes,
            priority_score: r.priority_score,
            recommendation_reason: r.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendRes {
    pub success: bool,
    pub severity: String,
    pub triage_match: TriageRequirementsDto,
    pub hospitals: Vec<RecommendedHospital>,
    pub count: usize,
}

impl RecommendRes {
    pub fn new(severity: Level, recommendations: &Recommendations) -> Self {
        let hospitals: Vec<RecommendedHospital> = recommendations
            .hits
            .iter()
            .map(RecommendedHospital::from)
            .collect();
        Self {
            success: true,
            severity: severity_label(severity).to_string(),
            triage_match: TriageRequirementsDto::from(&recommendations.requirements),
            count: hospitals.len(),
            hospitals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub success: bool,
    pub message: String,
    pub hospital_count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatsRes {
    pub total_hospitals: usize,
    /// Count per level, keyed by the level number as a string.
    pub by_level: BTreeMap<String, usize>,
    pub with_emergency_services: usize,
    pub average_bed_count: Option<f64>,
    pub unique_facilities: usize,
    pub unique_specialties: usize,
    pub generation: u64,
    /// RFC 3339 publish time of the current snapshot.
    pub published_at: String,
}

impl From<&DirectoryStats> for StatsRes {
    fn from(s: &DirectoryStats) -> Self {
        Self {
            total_hospitals: s.total_hospitals,
            by_level: s
                .by_level
                .iter()
                .map(|(level, count)| (level.to_string(), *count))
                .collect(),
            with_emergency_services: s.with_emergency_services,
            average_bed_count: s.average_bed_count,
            unique_facilities: s.unique_facilities,
            unique_specialties: s.unique_specialties,
            generation: s.generation,
            published_at: s.published_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FacilitiesRes {
    pub facilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpecialtiesRes {
    pub specialties: Vec<String>,
}
