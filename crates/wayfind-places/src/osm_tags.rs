//! Mapping from the closed POI taxonomy to OSM tag selectors.
//!
//! The taxonomy itself lives in `wayfind-core`; this module only knows how
//! each category is spelled in map data when building Overpass queries.

use wayfind_core::poi::PoiCategory;

/// `(key, value)` selector for one category, e.g. `("amenity", "cafe")`.
#[must_use]
pub fn selector(category: PoiCategory) -> (&'static str, &'static str) {
    match category {
        PoiCategory::Cafe => ("amenity", "cafe"),
        PoiCategory::Restaurant => ("amenity", "restaurant"),
        PoiCategory::FastFood => ("amenity", "fast_food"),
        PoiCategory::Bar => ("amenity", "bar"),
        PoiCategory::Pharmacy => ("amenity", "pharmacy"),
        PoiCategory::Hospital => ("amenity", "hospital"),
        PoiCategory::School => ("amenity", "school"),
        PoiCategory::Library => ("amenity", "library"),
        PoiCategory::Bank => ("amenity", "bank"),
        PoiCategory::Atm => ("amenity", "atm"),
        PoiCategory::Fuel => ("amenity", "fuel"),
        PoiCategory::Cinema => ("amenity", "cinema"),
        PoiCategory::Parking => ("amenity", "parking"),
        PoiCategory::Supermarket => ("shop", "supermarket"),
        PoiCategory::Park => ("leisure", "park"),
        PoiCategory::Gym => ("leisure", "fitness_centre"),
        PoiCategory::Hotel => ("tourism", "hotel"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_selector() {
        for &category in PoiCategory::ALL {
            let (key, value) = selector(category);
            assert!(!key.is_empty() && !value.is_empty());
        }
    }

    #[test]
    fn non_amenity_categories_use_their_own_keys() {
        assert_eq!(selector(PoiCategory::Supermarket), ("shop", "supermarket"));
        assert_eq!(selector(PoiCategory::Park), ("leisure", "park"));
        assert_eq!(selector(PoiCategory::Hotel), ("tourism", "hotel"));
    }
}
