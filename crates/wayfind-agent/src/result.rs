use serde::Serialize;

use wayfind_core::poi::Poi;
use wayfind_core::route::RouteInfo;

/// Normalized output of either agent.
///
/// `tools_used` and `reasoning` form the observability trace: which
/// collaborator operations ran, and a human-readable account of each plan
/// step.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pois: Vec<Poi>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteInfo>,
    pub tools_used: Vec<String>,
    pub reasoning: Vec<String>,
}

impl AgentResult {
    #[must_use]
    pub fn informational(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            pois: Vec::new(),
            routes: Vec::new(),
            tools_used: Vec::new(),
            reasoning: Vec::new(),
        }
    }
}
