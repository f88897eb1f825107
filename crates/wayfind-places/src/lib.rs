//! HTTP clients for the POI-search and geocoding collaborators.
//!
//! POI search speaks the Overpass query language scoped to a bounding box;
//! geocoding speaks the Nominatim search API. Both normalize responses into
//! `wayfind-core` types and never leak wire shapes upward.

pub mod error;
pub mod geocode;
pub mod osm_tags;
pub mod poi_client;

pub use error::PlacesError;
pub use geocode::GeocodeClient;
pub use poi_client::{PoiClient, PoiSearch};
