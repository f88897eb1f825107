//! Request orchestration.
//!
//! One state flow per request: load memory context (best-effort), classify,
//! gate on confidence, route to an agent by derived complexity, store the
//! outcome (best-effort), respond. Dependencies are injected once at
//! construction; nothing here is global.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use wayfind_classify::QueryClassifier;
use wayfind_core::query::{ClassifiedQuery, ConversationTurn, QueryIntent};
use wayfind_core::{ErrorCode, Location, UseCaseError};

use crate::memory::{MemoryRecord, MemoryStore};
use crate::multistep::MultiStepAgent;
use crate::result::AgentResult;
use crate::simple::SimpleAgent;
use crate::usecases::geocode::GeocodeContext;
use crate::Collaborators;

#[derive(Debug, Clone)]
pub struct OrchestratorRequest {
    pub query: String,
    pub user_id: String,
    pub user_location: Option<Location>,
    pub conversation_history: Vec<ConversationTurn>,
    pub memory_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct OrchestratorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassifiedQuery>,
    pub agent_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AgentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<UseCaseError>,
    pub timestamp: DateTime<Utc>,
}

/// Settings that shape request handling, loaded from `AppConfig` once.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Substituted when a request carries no usable user location.
    pub fallback_location: Location,
    pub geocode: GeocodeContext,
}

pub struct Orchestrator {
    classifier: QueryClassifier,
    collaborators: Collaborators,
    memory: Arc<dyn MemoryStore>,
    settings: OrchestratorSettings,
    simple: SimpleAgent,
    multi_step: MultiStepAgent,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        classifier: QueryClassifier,
        collaborators: Collaborators,
        memory: Arc<dyn MemoryStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            classifier,
            collaborators,
            memory,
            settings,
            simple: SimpleAgent::new(),
            multi_step: MultiStepAgent::new(),
        }
    }

    /// Handles one query end to end.
    ///
    /// Never returns a transport error: every failure becomes a structured
    /// `{success: false, error}` response.
    pub async fn handle(&self, request: OrchestratorRequest) -> OrchestratorResponse {
        // Memory context feeds classification as extra conversation turns.
        // Loads are best-effort and never block the flow.
        let mut context = request.conversation_history.clone();
        if request.memory_enabled {
            match self.memory.get_context(&request.user_id).await {
                Ok(summary) => {
                    // recent_queries is newest-first; front-inserting in that
                    // order leaves the prepended turns oldest-first.
                    for query in &summary.recent_queries {
                        context.insert(
                            0,
                            ConversationTurn {
                                role: "user".to_string(),
                                content: query.clone(),
                            },
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(user = %request.user_id, error = %e, "memory load failed");
                }
            }
        }

        let classification = self.classifier.classify(&request.query, &context).await;
        tracing::info!(
            intent = %classification.intent,
            confidence = classification.confidence,
            source = ?classification.source,
            "query classified"
        );

        // Low confidence or an explicit clarification intent is a soft
        // failure: no agent runs.
        if classification.needs_clarification() {
            return OrchestratorResponse {
                success: false,
                agent_used: "none".to_string(),
                result: None,
                error: Some(UseCaseError::new(
                    ErrorCode::InvalidInput,
                    "I couldn't pin down what you're looking for — could you be more specific?",
                )),
                classification: Some(classification),
                timestamp: Utc::now(),
            };
        }

        // Terminal informational exits. A full implementation would resolve
        // the referenced entity from conversation state.
        match classification.intent {
            QueryIntent::FollowUp => {
                return informational(
                    classification,
                    "Follow-up questions aren't wired to conversation state yet; please repeat the full request.",
                );
            }
            QueryIntent::GetDirections => {
                return informational(
                    classification,
                    "Turn-by-turn directions are handled by the map view; pick a result to route to it.",
                );
            }
            _ => {}
        }

        // Replace an absent or unset location with the configured fallback
        // before anything geospatial runs.
        let user_location = match &request.user_location {
            Some(location) if !location.is_unset() => location.clone(),
            _ => {
                tracing::debug!("no usable user location; applying fallback");
                self.settings.fallback_location.clone()
            }
        };

        let (agent_used, outcome) = match classification.complexity {
            wayfind_core::Complexity::Simple => (
                "simple",
                self.simple
                    .execute(
                        &self.collaborators,
                        &classification,
                        Some(&user_location),
                        &self.settings.geocode,
                    )
                    .await,
            ),
            wayfind_core::Complexity::MultiStep => (
                "multi-step",
                self.multi_step
                    .execute(
                        &self.collaborators,
                        &classification,
                        Some(&user_location),
                        &self.settings.geocode,
                    )
                    .await,
            ),
        };

        match outcome {
            Ok(output) => {
                if request.memory_enabled {
                    self.store_memory(&request, &classification, &output.data).await;
                }
                OrchestratorResponse {
                    success: true,
                    agent_used: agent_used.to_string(),
                    result: Some(output.data),
                    error: None,
                    classification: Some(classification),
                    timestamp: Utc::now(),
                }
            }
            Err(error) => OrchestratorResponse {
                success: false,
                agent_used: agent_used.to_string(),
                result: None,
                error: Some(error),
                classification: Some(classification),
                timestamp: Utc::now(),
            },
        }
    }

    /// Stores the interaction; only called after a successful agent run.
    async fn store_memory(
        &self,
        request: &OrchestratorRequest,
        classification: &ClassifiedQuery,
        result: &AgentResult,
    ) {
        let record = MemoryRecord {
            query: request.query.clone(),
            intent: classification.intent.to_string(),
            summary: result.summary.clone(),
            transport: classification.entities.transport,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.memory.add_memory(&request.user_id, record).await {
            tracing::warn!(user = %request.user_id, error = %e, "memory store failed");
        }
    }
}

fn informational(classification: ClassifiedQuery, message: &str) -> OrchestratorResponse {
    OrchestratorResponse {
        success: true,
        agent_used: "none".to_string(),
        result: Some(AgentResult::informational(message)),
        error: None,
        classification: Some(classification),
        timestamp: Utc::now(),
    }
}
