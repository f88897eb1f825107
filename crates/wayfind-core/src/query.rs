//! Classified-query model.
//!
//! The classifier turns free text into a [`ClassifiedQuery`]; the
//! orchestrator routes on its intent and derived complexity. Instances are
//! created once per query and treated as immutable after normalization.

use serde::{Deserialize, Serialize};

use crate::location::{Location, TransportMode};
use crate::poi::PoiCategory;

/// Closed intent set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryIntent {
    FindNearest,
    FindWithinTime,
    FindNearPoi,
    FindEnroute,
    GetDirections,
    FollowUp,
    Clarification,
}

impl QueryIntent {
    /// Complexity is a function of intent, never set independently.
    #[must_use]
    pub fn complexity(self) -> Complexity {
        match self {
            QueryIntent::FindNearPoi | QueryIntent::FindEnroute => Complexity::MultiStep,
            QueryIntent::FindNearest
            | QueryIntent::FindWithinTime
            | QueryIntent::GetDirections
            | QueryIntent::FollowUp
            | QueryIntent::Clarification => Complexity::Simple,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueryIntent::FindNearest => "find-nearest",
            QueryIntent::FindWithinTime => "find-within-time",
            QueryIntent::FindNearPoi => "find-near-poi",
            QueryIntent::FindEnroute => "find-enroute",
            QueryIntent::GetDirections => "get-directions",
            QueryIntent::FollowUp => "follow-up",
            QueryIntent::Clarification => "clarification",
        }
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueryIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find-nearest" => Ok(QueryIntent::FindNearest),
            "find-within-time" => Ok(QueryIntent::FindWithinTime),
            "find-near-poi" => Ok(QueryIntent::FindNearPoi),
            "find-enroute" => Ok(QueryIntent::FindEnroute),
            "get-directions" => Ok(QueryIntent::GetDirections),
            "follow-up" => Ok(QueryIntent::FollowUp),
            "clarification" => Ok(QueryIntent::Clarification),
            other => Err(format!("unknown intent: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    MultiStep,
}

/// Destination of an enroute query: free text until geocoding resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    Text(String),
    Resolved(Location),
}

impl Destination {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Destination::Text(t) => Some(t),
            Destination::Resolved(_) => None,
        }
    }
}

/// Entities extracted from the query text.
///
/// Mutated only by the classifier during normalization (brand→category
/// mapping, cuisine extraction, primary/secondary disambiguation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_poi: Option<PoiCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_poi: Option<PoiCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constraint_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// One prior exchange supplied as classification context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// `"user"` or `"assistant"`.
    pub role: String,
    pub content: String,
}

/// Which classification stage produced the final result.
///
/// The rule engine is both the fallback (LLM unavailable or unparsable) and
/// a trusted override when the sanity pass disagrees with the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationSource {
    Llm,
    RuleFallback,
    RuleOverride,
}

/// Output of the classifier, immutable after normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedQuery {
    pub intent: QueryIntent,
    pub complexity: Complexity,
    pub entities: QueryEntities,
    pub requires_context: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub source: ClassificationSource,
}

impl ClassifiedQuery {
    /// Builds a query with complexity derived from the intent and confidence
    /// clamped to [0, 1].
    #[must_use]
    pub fn new(
        intent: QueryIntent,
        entities: QueryEntities,
        confidence: f64,
        reasoning: impl Into<String>,
        source: ClassificationSource,
    ) -> Self {
        Self {
            intent,
            complexity: intent.complexity(),
            entities,
            requires_context: matches!(intent, QueryIntent::FollowUp),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            source,
        }
    }

    /// Callers must surface these as "be more specific" instead of executing.
    #[must_use]
    pub fn needs_clarification(&self) -> bool {
        self.intent == QueryIntent::Clarification || self.confidence < 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_derives_from_intent() {
        assert_eq!(QueryIntent::FindNearest.complexity(), Complexity::Simple);
        assert_eq!(QueryIntent::FindWithinTime.complexity(), Complexity::Simple);
        assert_eq!(QueryIntent::FindNearPoi.complexity(), Complexity::MultiStep);
        assert_eq!(QueryIntent::FindEnroute.complexity(), Complexity::MultiStep);
    }

    #[test]
    fn intent_round_trips_through_str() {
        for intent in [
            QueryIntent::FindNearest,
            QueryIntent::FindWithinTime,
            QueryIntent::FindNearPoi,
            QueryIntent::FindEnroute,
            QueryIntent::GetDirections,
            QueryIntent::FollowUp,
            QueryIntent::Clarification,
        ] {
            assert_eq!(intent.as_str().parse::<QueryIntent>().unwrap(), intent);
        }
    }

    #[test]
    fn confidence_is_clamped() {
        let q = ClassifiedQuery::new(
            QueryIntent::FindNearest,
            QueryEntities::default(),
            1.7,
            "test",
            ClassificationSource::Llm,
        );
        assert!((q.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn low_confidence_needs_clarification() {
        let q = ClassifiedQuery::new(
            QueryIntent::FindNearest,
            QueryEntities::default(),
            0.4,
            "test",
            ClassificationSource::Llm,
        );
        assert!(q.needs_clarification());
    }

    #[test]
    fn clarification_intent_needs_clarification_regardless_of_confidence() {
        let q = ClassifiedQuery::new(
            QueryIntent::Clarification,
            QueryEntities::default(),
            0.9,
            "test",
            ClassificationSource::RuleFallback,
        );
        assert!(q.needs_clarification());
    }
}
