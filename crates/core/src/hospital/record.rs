//! The hospital record held in a directory snapshot.

use medimap_types::{Coordinate, Level, NonEmptyText};

/// One facility, validated at import time and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalRecord {
    pub id: String,
    pub name: NonEmptyText,
    pub level: Level,
    pub location: Coordinate,
    /// Street address. Empty when the source did not provide one.
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

impl HospitalRecord {
    /// A record with only the mandatory fields set.
    pub fn new(id: impl Into<String>, name: NonEmptyText, level: Level, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            name,
            level,
            location,
            address: String::new(),
            phone: None,
            area: None,
            availability: None,
            state: None,
            email: None,
            website: None,
            facilities: Vec::new(),
            specialties: Vec::new(),
            emergency_services: true,
            bed_count: None,
        }
    }

    /// True if every requirement is a case-insensitive substring of some facility.
    pub fn offers_facilities(&self, required: &[String]) -> bool {
        contains_all(&self.facilities, required)
    }

    /// True if every requirement is a case-insensitive substring of some specialty.
    pub fn offers_specialties(&self, required: &[String]) -> bool {
        contains_all(&self.specialties, required)
    }
}

fn contains_all(offered: &[String], required: &[String]) -> bool {
    required.iter().all(|req| {
        let req = req.to_lowercase();
        offered.iter().any(|o| o.to_lowercase().contains(&req))
    })
}

/// Human description of a hospital care level.
pub fn level_description(level: Level) -> &'static str {
    match level.get() {
        1 => "Primary healthcare facility",
        2 => "Secondary care hospital",
        3 => "Tertiary care hospital with advanced facilities",
        _ => "Quaternary care hospital with specialized services",
    }
}
