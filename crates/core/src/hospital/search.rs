//! Hospital proximity search.
//!
//! [`search`] is a pure single-pass ranking function: one filter set in, one ranked list out.
//! It never widens its own query. When nothing matches, [`SearchResult::should_widen_levels`]
//! tells the caller whether retrying with every level could help; running that retry is a
//! caller decision.

use crate::constants::DEFAULT_TOP_N;
use crate::error::{MediMapError, MediMapResult};
use crate::geo::{estimate_travel_minutes, haversine_km, round_distance, validate_coordinate};
use crate::hospital::record::HospitalRecord;
use medimap_types::{Coordinate, Level};
use std::collections::BTreeSet;

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    origin: Coordinate,
    allowed_levels: BTreeSet<Level>,
    max_distance_km: Option<f64>,
    required_facilities: Vec<String>,
    required_specialties: Vec<String>,
}

impl SearchQuery {
    /// A query from `(lat, lng)` that accepts every level.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidCoordinate`] for out-of-range or non-finite input.
    pub fn new(lat: f64, lng: f64) -> MediMapResult<Self> {
        Ok(Self::from_origin(validate_coordinate(lat, lng)?))
    }

    pub fn from_origin(origin: Coordinate) -> Self {
        Self {
            origin,
            allowed_levels: Level::ALL.into_iter().collect(),
            max_distance_km: None,
            required_facilities: Vec::new(),
            required_specialties: Vec::new(),
        }
    }

    /// Restricts the query to `levels`.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidLevel`] if any value is outside `1..=4`, or
    /// [`MediMapError::InvalidInput`] if `levels` is empty.
    pub fn with_levels<I>(mut self, levels: I) -> MediMapResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let allowed = levels
            .into_iter()
            .map(|raw| Level::new(raw).map_err(MediMapError::InvalidLevel))
            .collect::<MediMapResult<BTreeSet<Level>>>()?;
        if allowed.is_empty() {
            return Err(MediMapError::InvalidInput(
                "allowed levels cannot be empty".into(),
            ));
        }
        self.allowed_levels = allowed;
        Ok(self)
    }

    /// Restricts the query to `level` and every level above it.
    pub fn at_or_above(mut self, level: Level) -> Self {
        self.allowed_levels = level.and_above().collect();
        self
    }

    /// Drops hospitals farther than `km` from the origin.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`] if `km` is negative or not finite.
    pub fn with_max_distance(mut self, km: f64) -> MediMapResult<Self> {
        if !km.is_finite() || km < 0.0 {
            return Err(MediMapError::InvalidInput(format!(
                "max distance must be a non-negative number of kilometres, got {km}"
            )));
        }
        self.max_distance_km = Some(km);
        Ok(self)
    }

    pub fn with_facilities(mut self, facilities: Vec<String>) -> Self {
        self.required_facilities = clean_terms(facilities);
        self
    }

    pub fn with_specialties(mut self, specialties: Vec<String>) -> Self {
        self.required_specialties = clean_terms(specialties);
        self
    }

    /// The same query with every level allowed.
    pub fn widened(&self) -> Self {
        Self {
            allowed_levels: Level::ALL.into_iter().collect(),
            ..self.clone()
        }
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn allowed_levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.allowed_levels.iter().copied()
    }

    pub fn allows(&self, level: Level) -> bool {
        self.allowed_levels.contains(&level)
    }

    pub fn allows_all_levels(&self) -> bool {
        self.allowed_levels.len() == Level::ALL.len()
    }

    pub fn max_distance_km(&self) -> Option<f64> {
        self.max_distance_km
    }
}

fn clean_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// One ranked hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub hospital: HospitalRecord,
    /// Rounded to two decimal places.
    pub distance_km: f64,
    pub travel_time_minutes: u32,
}

/// Ranked hits plus the counters behind the empty-result signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    /// Records in the searched directory.
    pub directory_size: usize,
    /// Records whose level was allowed by the query.
    pub level_matches: usize,
    /// Records passing every filter, before truncation to `top_n`.
    pub matches: usize,
    all_levels_allowed: bool,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when no record passed the filters, the directory had data, and the query excluded
    /// some levels. A result emptied only by `top_n = 0` does not qualify.
    pub fn should_widen_levels(&self) -> bool {
        self.matches == 0 && self.directory_size > 0 && !self.all_levels_allowed
    }
}

/// [`search`] with the default result count.
pub fn search_default(directory: &[HospitalRecord], query: &SearchQuery) -> SearchResult {
    search(directory, query, DEFAULT_TOP_N)
}

/// Ranks `directory` by distance from the query origin.
///
/// Filters by level, then facilities and specialties, then computes haversine distances,
/// applies the optional radius, sorts by rounded distance with `id` as tie-break, and keeps
/// the first `top_n`. Fewer matches than `top_n` is not an error; an empty directory yields an
/// empty result.
pub fn search(directory: &[HospitalRecord], query: &SearchQuery, top_n: usize) -> SearchResult {
    let level_filtered: Vec<&HospitalRecord> = directory
        .iter()
        .filter(|h| query.allows(h.level))
        .collect();
    let level_matches = level_filtered.len();

    let mut hits: Vec<SearchHit> = level_filtered
        .into_iter()
        .filter(|h| h.offers_facilities(&query.required_facilities))
        .filter(|h| h.offers_specialties(&query.required_specialties))
        .filter_map(|h| {
            let raw = haversine_km(query.origin, h.location);
            if query.max_distance_km.is_some_and(|max| raw > max) {
                return None;
            }
            Some(SearchHit {
                hospital: h.clone(),
                distance_km: round_distance(raw),
                travel_time_minutes: estimate_travel_minutes(raw),
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.hospital.id.cmp(&b.hospital.id))
    });
    let matches = hits.len();
    hits.truncate(top_n);

    tracing::debug!(
        origin = %query.origin,
        directory_size = directory.len(),
        level_matches,
        matches,
        returned = hits.len(),
        "hospital search"
    );

    SearchResult {
        hits,
        directory_size: directory.len(),
        level_matches,
        matches,
        all_levels_allowed: query.allows_all_levels(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medimap_types::NonEmptyText;
    use proptest::prelude::*;

    const ORIGIN: (f64, f64) = (12.9, 77.6);

    fn hospital(id: &str, level: i64, lat: f64, lng: f64) -> HospitalRecord {
        HospitalRecord::new(
            id,
            NonEmptyText::new(format!("Hospital {id}")).unwrap(),
            Level::new(level).unwrap(),
            Coordinate::new(lat, lng).unwrap(),
        )
    }

    /// Latitude offset that puts a point `km` due north of `ORIGIN`.
    fn north_of_origin(km: f64) -> f64 {
        ORIGIN.0 + (km / crate::constants::EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn level_filter_keeps_only_requested_level() {
        let directory = vec![
            hospital("h2", 2, north_of_origin(3.42), ORIGIN.1),
            hospital("h1", 1, north_of_origin(1.0), ORIGIN.1),
        ];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_levels([2])
            .unwrap();

        let result = search_default(&directory, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits[0].hospital.id, "h2");
        assert_eq!(result.hits[0].distance_km, 3.42);
        assert_eq!(result.level_matches, 1);
    }

    #[test]
    fn fewer_matches_than_top_n_returns_all() {
        let directory = vec![
            hospital("a", 2, 12.91, 77.6),
            hospital("b", 2, 12.95, 77.6),
        ];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        let result = search(&directory, &query, 5);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn truncates_to_top_n_nearest() {
        let directory: Vec<HospitalRecord> = (1..=8)
            .map(|i| hospital(&format!("h{i}"), 3, ORIGIN.0 + f64::from(i) * 0.01, ORIGIN.1))
            .collect();
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        let result = search_default(&directory, &query);
        let ids: Vec<&str> = result.hits.iter().map(|h| h.hospital.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h2", "h3", "h4", "h5"]);
    }

    #[test]
    fn top_n_zero_is_empty_not_error() {
        let directory = vec![hospital("a", 1, 12.91, 77.6)];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        assert!(search(&directory, &query, 0).is_empty());
    }

    #[test]
    fn top_n_zero_with_level_matches_does_not_signal_widening() {
        let directory = vec![hospital("a", 2, 12.91, 77.6)];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_levels([2])
            .unwrap();
        let result = search(&directory, &query, 0);
        assert!(result.is_empty());
        assert_eq!(result.level_matches, 1);
        assert_eq!(result.matches, 1);
        assert!(!result.should_widen_levels());
    }

    #[test]
    fn filter_miss_at_allowed_level_signals_widening() {
        let directory = vec![hospital("a", 2, 12.91, 77.6)];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_levels([2])
            .unwrap()
            .with_facilities(vec!["ICU".into()]);
        let result = search_default(&directory, &query);
        assert_eq!(result.level_matches, 1);
        assert_eq!(result.matches, 0);
        assert!(result.should_widen_levels());
    }

    #[test]
    fn equal_distances_tie_break_on_id() {
        // Mirror images across the origin's meridian are equidistant.
        let directory = vec![
            hospital("zeta", 2, 12.9, 77.65),
            hospital("alpha", 2, 12.9, 77.55),
        ];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        let result = search_default(&directory, &query);
        assert_eq!(result.hits[0].distance_km, result.hits[1].distance_km);
        assert_eq!(result.hits[0].hospital.id, "alpha");
        assert_eq!(result.hits[1].hospital.id, "zeta");
    }

    #[test]
    fn empty_directory_is_empty_result() {
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        let result = search_default(&[], &query);
        assert!(result.is_empty());
        assert_eq!(result.directory_size, 0);
        assert!(!result.should_widen_levels());
    }

    #[test]
    fn level_miss_signals_widening() {
        let directory = vec![hospital("a", 1, 12.91, 77.6)];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_levels([4])
            .unwrap();
        let result = search_default(&directory, &query);
        assert!(result.is_empty());
        assert!(result.should_widen_levels());

        let widened = search_default(&directory, &query.widened());
        assert_eq!(widened.len(), 1);
        assert!(!widened.should_widen_levels());
    }

    #[test]
    fn radius_filter_drops_far_hospitals() {
        let directory = vec![
            hospital("near", 2, north_of_origin(2.0), ORIGIN.1),
            hospital("far", 2, north_of_origin(20.0), ORIGIN.1),
        ];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_max_distance(10.0)
            .unwrap();
        let result = search_default(&directory, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits[0].hospital.id, "near");
    }

    #[test]
    fn facility_and_specialty_filters_apply() {
        let mut icu = hospital("icu", 3, 12.95, 77.6);
        icu.facilities = vec!["ICU".into(), "Emergency Room".into()];
        icu.specialties = vec!["Neurology".into()];
        let plain = hospital("plain", 3, 12.91, 77.6);
        let directory = vec![icu, plain];

        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1)
            .unwrap()
            .with_facilities(vec!["icu".into(), "  ".into()])
            .with_specialties(vec!["neuro".into()]);
        let result = search_default(&directory, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits[0].hospital.id, "icu");
    }

    #[test]
    fn invalid_coordinate_fails_before_search() {
        let err = SearchQuery::new(95.0, 0.0).expect_err("latitude out of range");
        assert!(matches!(err, MediMapError::InvalidCoordinate(_)));
        let err = SearchQuery::new(0.0, f64::NAN).expect_err("nan longitude");
        assert!(matches!(err, MediMapError::InvalidCoordinate(_)));
    }

    #[test]
    fn invalid_levels_rejected() {
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        assert!(matches!(
            query.clone().with_levels([0]),
            Err(MediMapError::InvalidLevel(_))
        ));
        assert!(matches!(
            query.clone().with_levels(Vec::<i64>::new()),
            Err(MediMapError::InvalidInput(_))
        ));
        assert!(matches!(
            query.with_max_distance(-1.0),
            Err(MediMapError::InvalidInput(_))
        ));
    }

    #[test]
    fn hits_carry_travel_time() {
        let directory = vec![hospital("a", 2, north_of_origin(3.42), ORIGIN.1)];
        let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap();
        assert_eq!(search_default(&directory, &query).hits[0].travel_time_minutes, 6);
    }

    fn arb_directory() -> impl Strategy<Value = Vec<HospitalRecord>> {
        proptest::collection::vec((1i64..=4, -60.0f64..60.0, -170.0f64..170.0), 0..40).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (level, lat, lng))| hospital(&format!("h{i:03}"), level, lat, lng))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn results_are_sorted_and_level_filtered(
            directory in arb_directory(),
            level in 1i64..=4,
            top_n in 0usize..10,
        ) {
            let query = SearchQuery::new(ORIGIN.0, ORIGIN.1).unwrap().with_levels([level]).unwrap();
            let result = search(&directory, &query, top_n);

            prop_assert!(result.len() <= top_n);
            let expected = directory.iter().filter(|h| i64::from(h.level.get()) == level).count();
            prop_assert_eq!(result.level_matches, expected);
            prop_assert_eq!(result.len(), expected.min(top_n));
            for hit in &result.hits {
                prop_assert_eq!(i64::from(hit.hospital.level.get()), level);
            }
            for pair in result.hits.windows(2) {
                prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            }
        }
    }
}
