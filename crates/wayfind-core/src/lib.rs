//! Domain model for the wayfind query-planning core.
//!
//! Value objects shared across the workspace: locations, POIs, isochrones,
//! routes, classified queries, the use-case result taxonomy, the POI category
//! synonym table, and application configuration. Everything here is a
//! request-scoped value — created per query, never mutated concurrently.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod geo;
pub mod location;
pub mod poi;
pub mod query;
pub mod result;
pub mod route;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use geo::{
    estimate_travel_time_min, haversine_distance_m, point_in_isochrone, BoundingBox, Coord,
};
pub use location::{Location, TransportMode};
pub use poi::{Isochrone, Poi, PoiCategory};
pub use query::{
    ClassificationSource, ClassifiedQuery, Complexity, ConversationTurn, Destination,
    QueryEntities, QueryIntent,
};
pub use result::{ErrorCode, UseCaseError, UseCaseOutput, UseCaseResult};
pub use route::{RouteInfo, RouteStep};
