//! Two-stage query classifier.
//!
//! Stage one asks the LLM collaborator for a structured classification and
//! parses its reply leniently. Any failure along that path — transport,
//! empty reply, unparsable JSON — downgrades to the rule engine. Both
//! stages' output passes through [`crate::normalize::finalize`], which may
//! further substitute a rule override. Classification is total: it never
//! returns an error.

use std::sync::Arc;

use serde::Deserialize;

use wayfind_core::categories::CategoryTable;
use wayfind_core::poi::PoiCategory;
use wayfind_core::query::{
    ClassificationSource, ClassifiedQuery, ConversationTurn, Destination, QueryEntities,
    QueryIntent,
};
use wayfind_core::TransportMode;

use crate::error::ClassifyError;
use crate::llm::{extract_first_json, GenerateOptions, TextGenerator};
use crate::normalize;
use crate::prompt::classification_prompt;
use crate::rules;

/// Classification shape requested from the LLM. Every field is optional —
/// the model is not trusted to follow the schema exactly.
#[derive(Debug, Deserialize)]
struct WireClassification {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    primary_poi: Option<String>,
    #[serde(default)]
    secondary_poi: Option<String>,
    #[serde(default)]
    transport: Option<String>,
    #[serde(default)]
    time_constraint_min: Option<f64>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Classifier with an optional LLM stage.
pub struct QueryClassifier {
    generator: Option<Arc<dyn TextGenerator>>,
    table: Arc<CategoryTable>,
}

impl QueryClassifier {
    #[must_use]
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, table: Arc<CategoryTable>) -> Self {
        Self { generator, table }
    }

    /// A classifier that skips the LLM stage entirely.
    #[must_use]
    pub fn rules_only(table: Arc<CategoryTable>) -> Self {
        Self {
            generator: None,
            table,
        }
    }

    /// Classifies a query, with up to three turns of context.
    ///
    /// Total: failures inside the LLM stage are logged and downgraded to
    /// the rule stage rather than surfaced.
    pub async fn classify(&self, text: &str, context: &[ConversationTurn]) -> ClassifiedQuery {
        if let Some(generator) = &self.generator {
            match self.classify_with_llm(generator.as_ref(), text, context).await {
                Ok(query) => return query,
                Err(e) => {
                    tracing::warn!(error = %e, "LLM classification failed, falling back to rules");
                }
            }
        }
        let draft = rules::rule_classify(text, &self.table);
        normalize::finalize(draft, text, &self.table)
    }

    async fn classify_with_llm(
        &self,
        generator: &dyn TextGenerator,
        text: &str,
        context: &[ConversationTurn],
    ) -> Result<ClassifiedQuery, ClassifyError> {
        let prompt = classification_prompt(text, context);
        let reply = generator.generate(&prompt, &GenerateOptions::default()).await?;

        let value = extract_first_json(&reply).ok_or_else(|| {
            ClassifyError::UnusableReply(format!(
                "no JSON object in reply: {}",
                reply.chars().take(120).collect::<String>()
            ))
        })?;
        let wire: WireClassification =
            serde_json::from_value(value).map_err(|e| ClassifyError::Deserialize {
                context: "classification reply".to_string(),
                source: e,
            })?;

        let draft = self.draft_from_wire(wire);
        Ok(normalize::finalize(draft, text, &self.table))
    }

    /// Converts the untrusted wire shape into a typed draft.
    ///
    /// An unknown or missing intent is forced to `clarification` with
    /// confidence capped at 0.5. Category strings are normalized through
    /// the synonym table, so brand names land on their categories and a
    /// "cuisine restaurant" phrase stays a plain restaurant with the
    /// cuisine split out.
    fn draft_from_wire(&self, wire: WireClassification) -> ClassifiedQuery {
        let parsed_intent = wire
            .intent
            .as_deref()
            .and_then(|s| s.trim().parse::<QueryIntent>().ok());
        let mut confidence = wire.confidence.unwrap_or(0.5);
        let intent = match parsed_intent {
            Some(intent) => intent,
            None => {
                confidence = confidence.min(0.5);
                QueryIntent::Clarification
            }
        };

        let (primary_poi, primary_cuisine) = wire
            .primary_poi
            .as_deref()
            .map_or((None, None), |raw| self.resolve_category(raw));
        let (secondary_poi, _) = wire
            .secondary_poi
            .as_deref()
            .map_or((None, None), |raw| self.resolve_category(raw));

        let entities = QueryEntities {
            primary_poi,
            secondary_poi: secondary_poi.filter(|&s| Some(s) != primary_poi),
            transport: wire.transport.as_deref().and_then(parse_transport),
            time_constraint_min: wire.time_constraint_min.filter(|t| *t > 0.0),
            destination: wire
                .destination
                .filter(|d| !d.trim().is_empty())
                .map(Destination::Text),
            cuisine: wire.cuisine.or(primary_cuisine),
            keywords: wire.keywords,
        };

        ClassifiedQuery::new(
            intent,
            entities,
            confidence,
            wire.reasoning.unwrap_or_else(|| "llm classification".to_string()),
            ClassificationSource::Llm,
        )
    }

    /// Maps a free-text category mention to the closed taxonomy, splitting
    /// out an embedded cuisine word ("italian restaurant" → restaurant +
    /// italian).
    fn resolve_category(&self, raw: &str) -> (Option<PoiCategory>, Option<String>) {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() {
            return (None, None);
        }
        let cuisine = self.table.find_cuisine(&lower).map(ToOwned::to_owned);
        let category = self.table.category_for(&lower).or_else(|| {
            rules::categories_in_text(&lower, &self.table)
                .first()
                .map(|&(_, c)| c)
        });
        // A cuisine word alone still means "somewhere to eat".
        let category = category.or(cuisine.as_ref().map(|_| PoiCategory::Restaurant));
        (category, cuisine)
    }
}

fn parse_transport(raw: &str) -> Option<TransportMode> {
    match raw.trim().to_lowercase().as_str() {
        "walking" | "walk" | "foot" => Some(TransportMode::Walking),
        "driving" | "drive" | "car" => Some(TransportMode::Driving),
        "cycling" | "bike" | "bicycle" => Some(TransportMode::Cycling),
        "public_transport" | "transit" | "bus" | "train" => Some(TransportMode::PublicTransport),
        _ => None,
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
