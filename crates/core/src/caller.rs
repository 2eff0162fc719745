//! Caller information and inbound triage reports.

use crate::error::{MediMapError, MediMapResult};
use crate::geo::validate_coordinate;
use crate::hospital::search::SearchQuery;
use medimap_types::{Coordinate, Level, NonEmptyText};

/// Who is calling and where from.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerInfo {
    pub caller_id: NonEmptyText,
    pub location: Coordinate,
}

impl CallerInfo {
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`] for an empty id or
    /// [`MediMapError::InvalidCoordinate`] for a bad location.
    pub fn new(caller_id: &str, lat: f64, lng: f64) -> MediMapResult<Self> {
        Ok(Self {
            caller_id: NonEmptyText::new(caller_id)
                .map_err(|_| MediMapError::InvalidInput("caller id cannot be empty".into()))?,
            location: validate_coordinate(lat, lng)?,
        })
    }
}

/// Supplies the current caller, if one is known.
pub trait CallerInfoSource: Send + Sync {
    fn current(&self) -> Option<CallerInfo>;
}

/// A fixed caller, typically configured from the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticCallerInfo {
    caller: Option<CallerInfo>,
}

impl StaticCallerInfo {
    pub fn new(caller: Option<CallerInfo>) -> Self {
        Self { caller }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl CallerInfoSource for StaticCallerInfo {
    fn current(&self) -> Option<CallerInfo> {
        self.caller.clone()
    }
}

/// A validated report of an emergency from a known caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageReport {
    pub caller_id: NonEmptyText,
    pub location: Coordinate,
    pub emergency_level: Level,
}

impl TriageReport {
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`], [`MediMapError::InvalidCoordinate`] or
    /// [`MediMapError::InvalidLevel`] for the first field that fails validation.
    pub fn new(caller_id: &str, lat: f64, lng: f64, emergency_level: i64) -> MediMapResult<Self> {
        let caller = CallerInfo::new(caller_id, lat, lng)?;
        let emergency_level = Level::new(emergency_level).map_err(MediMapError::InvalidLevel)?;
        Ok(Self {
            caller_id: caller.caller_id,
            location: caller.location,
            emergency_level,
        })
    }

    /// Hospitals able to handle the reported emergency: those at the emergency level or above.
    pub fn hospital_query(&self) -> SearchQuery {
        SearchQuery::from_origin(self.location).at_or_above(self.emergency_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::{search_default, HospitalRecord};

    #[test]
    fn static_source_reports_configured_caller() {
        let caller = CallerInfo::new("caller-7", 12.9, 77.6).unwrap();
        let source = StaticCallerInfo::new(Some(caller.clone()));
        assert_eq!(source.current(), Some(caller));
        assert_eq!(StaticCallerInfo::unavailable().current(), None);
    }

    #[test]
    fn caller_info_validates_fields() {
        assert!(matches!(
            CallerInfo::new("  ", 0.0, 0.0),
            Err(MediMapError::InvalidInput(_))
        ));
        assert!(matches!(
            CallerInfo::new("c", 0.0, 200.0),
            Err(MediMapError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn report_rejects_bad_level() {
        let err = TriageReport::new("c", 1.0, 1.0, 5).expect_err("level 5");
        assert!(matches!(err, MediMapError::InvalidLevel(_)));
    }

    #[test]
    fn report_query_keeps_levels_at_or_above_emergency() {
        let report = TriageReport::new("c", 12.9, 77.6, 3).unwrap();
        let query = report.hospital_query();
        let levels: Vec<u8> = query.allowed_levels().map(Level::get).collect();
        assert_eq!(levels, vec![3, 4]);

        let directory: Vec<HospitalRecord> = (1..=4)
            .map(|l| {
                HospitalRecord::new(
                    format!("h{l}"),
                    NonEmptyText::new("h").unwrap(),
                    Level::new(l).unwrap(),
                    Coordinate::new(12.9 + f64::from(l as u8) * 0.01, 77.6).unwrap(),
                )
            })
            .collect();
        let ids: Vec<String> = search_default(&directory, &query)
            .hits
            .into_iter()
            .map(|h| h.hospital.id)
            .collect();
        assert_eq!(ids, vec!["h3", "h4"]);
    }
}
