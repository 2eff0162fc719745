//! Great-circle distance and coordinate validation.

use crate::constants::{DISTANCE_DECIMALS, EARTH_RADIUS_KM, TRAVEL_MINUTES_PER_KM};
use crate::error::{MediMapError, MediMapResult};
use medimap_types::Coordinate;

/// Validates a raw latitude/longitude pair.
///
/// This is the single entry point for untrusted coordinates (search queries, caller info,
/// triage reports), so all of them fail the same way.
///
/// # Errors
///
/// Returns [`MediMapError::InvalidCoordinate`] if either value is non-finite or out of range.
pub fn validate_coordinate(lat: f64, lng: f64) -> MediMapResult<Coordinate> {
    Coordinate::new(lat, lng).map_err(MediMapError::InvalidCoordinate)
}

/// Haversine distance in kilometres between two coordinates on a sphere of radius
/// [`EARTH_RADIUS_KM`].
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat().to_radians(), b.lat().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng() - a.lng()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Clamp guards against h drifting just above 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Rounds a distance to [`DISTANCE_DECIMALS`] places.
pub fn round_distance(km: f64) -> f64 {
    let factor = 10f64.powi(DISTANCE_DECIMALS);
    (km * factor).round() / factor
}

/// Rough travel time estimate in whole minutes.
pub fn estimate_travel_minutes(km: f64) -> u32 {
    (km * TRAVEL_MINUTES_PER_KM).floor().max(0.0) as u32
}
