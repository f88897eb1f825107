//! Plan execution for classified place-finding queries.
//!
//! The use-case layer turns one classified intent into a bounded sequence
//! of collaborator calls (isochrones, POI search, geocoding, routing,
//! stopover optimization) behind the [`wayfind_core::UseCaseResult`]
//! contract. The Simple and Multi-Step agents select and chain use cases;
//! the orchestrator owns classification, routing between agents, and
//! best-effort memory.

pub mod memory;
pub mod multistep;
pub mod orchestrator;
pub mod result;
pub mod simple;
pub mod strategy;
pub mod usecases;

use wayfind_places::{GeocodeClient, PoiClient};
use wayfind_routing::RoutingClient;

pub use memory::{InMemoryStore, MemoryContextSummary, MemoryRecord, MemoryStore, NoopMemory};
pub use orchestrator::{Orchestrator, OrchestratorRequest, OrchestratorResponse, OrchestratorSettings};
pub use result::AgentResult;

/// The network collaborators shared by every use case.
///
/// Constructed once at process start and passed by reference into
/// request-scoped handlers.
pub struct Collaborators {
    pub routing: RoutingClient,
    pub pois: PoiClient,
    pub geocoder: GeocodeClient,
}
