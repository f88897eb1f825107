use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, Coord};
use crate::location::TransportMode;

/// Closed POI category taxonomy.
///
/// Free-text tokens (brand names, cuisine words, synonyms) are normalized
/// into this enum by the classifier; see [`crate::categories`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Cafe,
    Restaurant,
    FastFood,
    Bar,
    Supermarket,
    Pharmacy,
    Hospital,
    Park,
    School,
    Library,
    Bank,
    Atm,
    Fuel,
    Hotel,
    Gym,
    Cinema,
    Parking,
}

impl PoiCategory {
    pub const ALL: &'static [PoiCategory] = &[
        PoiCategory::Cafe,
        PoiCategory::Restaurant,
        PoiCategory::FastFood,
        PoiCategory::Bar,
        PoiCategory::Supermarket,
        PoiCategory::Pharmacy,
        PoiCategory::Hospital,
        PoiCategory::Park,
        PoiCategory::School,
        PoiCategory::Library,
        PoiCategory::Bank,
        PoiCategory::Atm,
        PoiCategory::Fuel,
        PoiCategory::Hotel,
        PoiCategory::Gym,
        PoiCategory::Cinema,
        PoiCategory::Parking,
    ];

    /// Canonical lowercase name, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PoiCategory::Cafe => "cafe",
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::FastFood => "fast_food",
            PoiCategory::Bar => "bar",
            PoiCategory::Supermarket => "supermarket",
            PoiCategory::Pharmacy => "pharmacy",
            PoiCategory::Hospital => "hospital",
            PoiCategory::Park => "park",
            PoiCategory::School => "school",
            PoiCategory::Library => "library",
            PoiCategory::Bank => "bank",
            PoiCategory::Atm => "atm",
            PoiCategory::Fuel => "fuel",
            PoiCategory::Hotel => "hotel",
            PoiCategory::Gym => "gym",
            PoiCategory::Cinema => "cinema",
            PoiCategory::Parking => "parking",
        }
    }

    /// Categories that are routinely unnamed in map data and should not be
    /// dropped for lacking a name tag.
    #[must_use]
    pub fn tolerates_unnamed(self) -> bool {
        matches!(
            self,
            PoiCategory::Park | PoiCategory::Parking | PoiCategory::Atm
        )
    }
}

impl std::fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoiCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown POI category: {s}"))
    }
}

/// A point of interest returned by a search.
///
/// The `distance_*` and `travel_time_*` fields are computed per search from
/// the anchor or user location used for that search, never taken from the
/// upstream service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub category: PoiCategory,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_anchor_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_from_anchor_min: Option<f64>,
}

impl Poi {
    #[must_use]
    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Reachable-area polygon set for one (center, mode, time) request.
///
/// Produced by the routing collaborator and consumed read-only: the bbox is
/// a cheap pre-filter, the polygons are the authoritative boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Isochrone {
    pub polygons: Vec<Vec<Coord>>,
    pub bbox: BoundingBox,
    pub mode: TransportMode,
    pub range_minutes: f64,
    pub center: Coord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for &cat in PoiCategory::ALL {
            let parsed: PoiCategory = cat.as_str().parse().unwrap();
            assert_eq!(parsed, cat);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("speakeasy".parse::<PoiCategory>().is_err());
    }

    #[test]
    fn category_serde_matches_as_str() {
        let json = serde_json::to_string(&PoiCategory::FastFood).unwrap();
        assert_eq!(json, "\"fast_food\"");
    }
}
