use serde::{Deserialize, Serialize};

use crate::geo::Coord;
use crate::result::UseCaseError;

/// A geographic point with an optional human-readable name.
///
/// `(0, 0)` is the "unset" sentinel produced by clients that have no fix;
/// callers must replace it with a fallback before any geospatial call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            display_name: None,
        }
    }

    #[must_use]
    pub fn named(lat: f64, lng: f64, display_name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            display_name: Some(display_name.into()),
        }
    }

    #[must_use]
    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// True for the `(0, 0)` "no fix" sentinel.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Checks coordinate ranges: lat ∈ [-90, 90], lng ∈ [-180, 180].
    ///
    /// The unset sentinel fails validation — substitute a fallback first.
    ///
    /// # Errors
    ///
    /// Returns [`UseCaseError`] with code `InvalidCoordinates` when out of
    /// range or unset.
    pub fn validate(&self) -> Result<(), UseCaseError> {
        if self.is_unset() {
            return Err(UseCaseError::invalid_coordinates(
                "location is unset (0, 0); a fallback must be applied first",
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(UseCaseError::invalid_coordinates(format!(
                "coordinates out of range: ({}, {})",
                self.lat, self.lng
            )));
        }
        Ok(())
    }
}

/// Transport mode for isochrone, routing, and time-estimate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    Driving,
    Cycling,
    PublicTransport,
}

impl TransportMode {
    /// Average speed used by the fallback travel-time estimate.
    #[must_use]
    pub fn speed_m_s(self) -> f64 {
        match self {
            TransportMode::Walking => 1.4,
            TransportMode::Cycling => 4.2,
            TransportMode::PublicTransport => 8.3,
            TransportMode::Driving => 13.9,
        }
    }

    /// Profile segment used in routing-service URLs.
    #[must_use]
    pub fn routing_profile(self) -> &'static str {
        match self {
            TransportMode::Walking => "foot-walking",
            TransportMode::Cycling => "cycling-regular",
            // No transit profile on the routing service; driving is the
            // closest approximation for isochrone envelopes.
            TransportMode::PublicTransport | TransportMode::Driving => "driving-car",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Walking => write!(f, "walking"),
            TransportMode::Driving => write!(f, "driving"),
            TransportMode::Cycling => write!(f, "cycling"),
            TransportMode::PublicTransport => write!(f, "public_transport"),
        }
    }
}
