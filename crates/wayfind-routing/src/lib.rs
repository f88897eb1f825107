//! HTTP client for the routing collaborator.
//!
//! Wraps an OpenRouteService-compatible deployment: isochrones, directions,
//! duration/distance matrices, and a VROOM-style stopover optimization
//! endpoint. Responses are normalized into `wayfind-core` domain types;
//! transient failures are retried with exponential back-off.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

mod retry;

pub use client::RoutingClient;
pub use error::RoutingError;
pub use types::{Matrix, OptimizationJob, OptimizationResult, OptimizationVehicle, RouteOptions};
