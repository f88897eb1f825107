//! Use-case layer.
//!
//! One module per operation. Every public function returns
//! [`wayfind_core::UseCaseResult`]; collaborator error types are converted
//! to the closed [`ErrorCode`] taxonomy at this boundary and never leak.

pub mod enroute;
pub mod geocode;
pub mod near_poi;
pub mod nearest;
pub mod route;
pub mod within_time;

use wayfind_core::geo::{estimate_travel_time_min, haversine_distance_m, Coord};
use wayfind_core::poi::Poi;
use wayfind_core::{ErrorCode, Location, TransportMode, UseCaseError};
use wayfind_places::PlacesError;
use wayfind_routing::RoutingError;

/// Largest accepted time constraint, minutes.
const MAX_TIME_CONSTRAINT_MIN: f64 = 180.0;

pub(crate) fn isochrone_failed(e: &RoutingError) -> UseCaseError {
    UseCaseError::new(ErrorCode::IsochroneFailed, e.to_string())
}

pub(crate) fn routing_failed(e: &RoutingError) -> UseCaseError {
    UseCaseError::new(ErrorCode::RoutingFailed, e.to_string())
}

pub(crate) fn optimization_failed(e: &RoutingError) -> UseCaseError {
    UseCaseError::new(ErrorCode::OptimizationFailed, e.to_string())
}

pub(crate) fn poi_search_failed(e: &PlacesError) -> UseCaseError {
    UseCaseError::new(ErrorCode::PoiSearchFailed, e.to_string())
}

pub(crate) fn geocoding_failed(message: impl Into<String>) -> UseCaseError {
    UseCaseError::new(ErrorCode::GeocodingFailed, message)
}

/// Validates a caller-supplied location: present, set, in range.
pub(crate) fn require_location<'a>(
    location: Option<&'a Location>,
    field: &str,
) -> Result<&'a Location, UseCaseError> {
    let location = location.ok_or_else(|| UseCaseError::missing_field(field))?;
    location.validate()?;
    Ok(location)
}

/// Validates a time constraint: finite and in `(0, 180]` minutes.
pub(crate) fn require_time_constraint(minutes: f64) -> Result<f64, UseCaseError> {
    if !minutes.is_finite() || minutes <= 0.0 || minutes > MAX_TIME_CONSTRAINT_MIN {
        return Err(UseCaseError::invalid_time_constraint(minutes));
    }
    Ok(minutes)
}

/// Stamps user-relative distance and estimated travel time onto a POI.
pub(crate) fn annotate_from(origin: Coord, mode: TransportMode, poi: &mut Poi) {
    let distance = haversine_distance_m(origin, poi.coord());
    poi.distance_m = Some(distance);
    poi.travel_time_min = Some(estimate_travel_time_min(distance, mode));
}

/// Sorts POIs by their stamped distance, unknowns last.
pub(crate) fn sort_by_distance(pois: &mut [Poi]) {
    pois.sort_by(|a, b| {
        let da = a.distance_m.unwrap_or(f64::INFINITY);
        let db = b.distance_m.unwrap_or(f64::INFINITY);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_location_is_missing_required_field() {
        let err = require_location(None, "user_location").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn unset_location_is_invalid_coordinates() {
        let unset = Location::new(0.0, 0.0);
        let err = require_location(Some(&unset), "user_location").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinates);
    }

    #[test]
    fn time_constraint_bounds() {
        assert!(require_time_constraint(15.0).is_ok());
        assert!(require_time_constraint(180.0).is_ok());
        assert!(require_time_constraint(0.0).is_err());
        assert!(require_time_constraint(-5.0).is_err());
        assert!(require_time_constraint(181.0).is_err());
        assert!(require_time_constraint(f64::NAN).is_err());
    }
}
