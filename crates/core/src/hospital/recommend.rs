//! Triage-aware hospital recommendation.
//!
//! Where [`crate::hospital::search`] ranks purely by distance, [`recommend`] weighs distance
//! against the caller's severity level, the hospital's care level, its emergency services and
//! how well its facilities and specialties fit the reported symptoms. Every hospital within the
//! radius is kept; the score only orders them.

use crate::constants::DEFAULT_RECOMMEND_RADIUS_KM;
use crate::error::{MediMapError, MediMapResult};
use crate::geo::{estimate_travel_minutes, haversine_km, round_distance, validate_coordinate};
use crate::hospital::record::{level_description, HospitalRecord};
use medimap_types::{Coordinate, Level};

const BASE_SCORE: f64 = 100.0;
const DISTANCE_PENALTY_PER_KM: f64 = 5.0;
const URGENT_EMERGENCY_BONUS: f64 = 20.0;
const ROUTINE_EMERGENCY_BONUS: f64 = 5.0;
const FACILITY_BONUS: f64 = 3.0;
const SPECIALTY_BONUS: f64 = 5.0;

/// Facilities that earn a bonus whatever the severity.
const BONUS_FACILITIES: [&str; 5] = [
    "emergency care",
    "24/7 services",
    "emergency room",
    "laboratory",
    "primary care",
];

/// Symptom to specialties worth preferring, shown to the caller.
const PREFERRED_SPECIALTIES: [(&str, &[&str]); 8] = [
    ("chest pain", &["Cardiology", "Emergency Medicine"]),
    ("heart attack", &["Cardiology", "Emergency Medicine"]),
    ("stroke", &["Neurology", "Emergency Medicine"]),
    ("broken bone", &["Orthopedics", "Radiology"]),
    ("pregnancy", &["Obstetrics", "Gynecology"]),
    ("mental health", &["Psychiatry", "Psychology"]),
    ("eye problems", &["Ophthalmology"]),
    ("skin problems", &["Dermatology"]),
];

/// Symptom to specialties that raise a hospital's score.
const SCORED_SPECIALTIES: [(&str, &[&str]); 7] = [
    ("chest pain", &["general medicine", "emergency medicine"]),
    ("fever", &["general medicine", "family medicine"]),
    ("breathing difficulty", &["general medicine", "emergency medicine"]),
    ("stomach pain", &["general medicine"]),
    ("headache", &["general medicine", "family medicine"]),
    ("broken bone", &["general medicine"]),
    ("pregnancy", &["general medicine", "family medicine"]),
];

/// What a caller at a given severity should look for in a hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageRequirements {
    pub preferred_facilities: Vec<String>,
    pub preferred_specialties: Vec<String>,
    pub prefers_emergency_services: bool,
}

impl TriageRequirements {
    pub fn for_severity(severity: Level, symptoms: &[String]) -> Self {
        let facilities: &[&str] = match severity.get() {
            4 => &["Emergency Room", "ICU", "Surgery", "24/7 Services"],
            3 => &["Emergency Care", "Laboratory", "24/7 Services"],
            _ => &["Outpatient", "Primary Care"],
        };
        let mut specialties: Vec<String> = Vec::new();
        for symptom in symptoms {
            for specialty in lookup(&PREFERRED_SPECIALTIES, symptom) {
                if !specialties.iter().any(|s| s == specialty) {
                    specialties.push((*specialty).to_string());
                }
            }
        }
        Self {
            preferred_facilities: facilities.iter().map(|f| f.to_string()).collect(),
            preferred_specialties: specialties,
            prefers_emergency_services: severity == Level::MAX,
        }
    }
}

fn lookup(table: &[(&str, &'static [&'static str])], symptom: &str) -> &'static [&'static str] {
    table
        .iter()
        .find(|(key, _)| *key == symptom)
        .map(|(_, values)| *values)
        .unwrap_or_default()
}

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendQuery {
    origin: Coordinate,
    severity: Level,
    /// Trimmed and lower-cased.
    symptoms: Vec<String>,
    max_distance_km: f64,
}

impl RecommendQuery {
    /// A query from `(lat, lng)` for a caller at `severity`, within the default radius.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidCoordinate`] for out-of-range or non-finite input.
    pub fn new(lat: f64, lng: f64, severity: Level) -> MediMapResult<Self> {
        Ok(Self {
            origin: validate_coordinate(lat, lng)?,
            severity,
            symptoms: Vec::new(),
            max_distance_km: DEFAULT_RECOMMEND_RADIUS_KM,
        })
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = symptoms
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`] if `km` is negative or not finite.
    pub fn with_max_distance(mut self, km: f64) -> MediMapResult<Self> {
        if !km.is_finite() || km < 0.0 {
            return Err(MediMapError::InvalidInput(format!(
                "max distance must be a non-negative number of kilometres, got {km}"
            )));
        }
        self.max_distance_km = km;
        Ok(self)
    }

    pub fn severity(&self) -> Level {
        self.severity
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    pub fn requirements(&self) -> TriageRequirements {
        TriageRequirements::for_severity(self.severity, &self.symptoms)
    }
}

/// One recommended hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub hospital: HospitalRecord,
    /// Rounded to two decimal places.
    pub distance_km: f64,
    pub travel_time_minutes: u32,
    /// Rounded to two decimal places; never negative.
    pub priority_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub requirements: TriageRequirements,
    pub hits: Vec<Recommendation>,
}

fn urgency_multiplier(severity: Level) -> f64 {
    match severity.get() {
        4 => 2.0,
        3 => 1.8,
        2 => 1.3,
        _ => 1.0,
    }
}

fn level_bonus(level: Level) -> f64 {
    f64::from(level.get() - 1) * 10.0
}

/// Scores `hospital` for a caller `distance_km` away. Higher is better.
pub fn priority_score(
    hospital: &HospitalRecord,
    severity: Level,
    distance_km: f64,
    symptoms: &[String],
) -> f64 {
    let mut score = BASE_SCORE - distance_km * DISTANCE_PENALTY_PER_KM;
    if hospital.emergency_services {
        score += if severity.get() >= 3 {
            URGENT_EMERGENCY_BONUS
        } else {
            ROUTINE_EMERGENCY_BONUS
        };
    }
    score *= urgency_multiplier(severity);
    score += level_bonus(hospital.level);

    for facility in BONUS_FACILITIES {
        if hospital.offers_facilities(&[facility.to_string()]) {
            score += FACILITY_BONUS;
        }
    }
    for symptom in symptoms {
        for specialty in lookup(&SCORED_SPECIALTIES, symptom) {
            if hospital.offers_specialties(&[specialty.to_string()]) {
                score += SPECIALTY_BONUS;
            }
        }
    }
    score.max(0.0)
}

/// Human explanation of why `hospital` suits the caller.
pub fn recommendation_reason(hospital: &HospitalRecord, symptoms: &[String]) -> String {
    let mut reasons = vec![level_description(hospital.level)];
    if hospital.emergency_services {
        reasons.push("24/7 emergency services available");
    }
    for symptom in symptoms {
        let reason = match symptom.as_str() {
            "chest pain" | "heart attack" if hospital.offers_specialties(&["cardiology".into()]) => {
                "Cardiology specialization for heart conditions"
            }
            "stroke" if hospital.offers_specialties(&["neurology".into()]) => {
                "Neurology specialization for stroke care"
            }
            _ => continue,
        };
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
    reasons.join("; ")
}

/// Ranks every hospital within the query radius by [`priority_score`], highest first.
///
/// Ties fall back to distance, then `id`. Keeps the first `top_n`.
pub fn recommend(directory: &[HospitalRecord], query: &RecommendQuery, top_n: usize) -> Recommendations {
    let mut hits: Vec<Recommendation> = directory
        .iter()
        .filter_map(|h| {
            let raw = haversine_km(query.origin, h.location);
            if raw > query.max_distance_km {
                return None;
            }
            Some(Recommendation {
                hospital: h.clone(),
                distance_km: round_distance(raw),
                travel_time_minutes: estimate_travel_minutes(raw),
                priority_score: round_distance(priority_score(h, query.severity, raw, &query.symptoms)),
                reason: recommendation_reason(h, &query.symptoms),
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.priority_score
            .total_cmp(&a.priority_score)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
            .then_with(|| a.hospital.id.cmp(&b.hospital.id))
    });
    hits.truncate(top_n);

    tracing::debug!(
        origin = %query.origin,
        severity = query.severity.get(),
        returned = hits.len(),
        "hospital recommendation"
    );

    Recommendations {
        requirements: query.requirements(),
        hits,
    }
}
