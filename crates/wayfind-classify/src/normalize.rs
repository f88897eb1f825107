//! Post-classification invariants.
//!
//! Applied, in order, to the output of either classification stage. The
//! final step re-checks the raw text with the rule engine and discards the
//! draft entirely when an unambiguous textual cue contradicts it.

use wayfind_core::categories::CategoryTable;
use wayfind_core::query::{ClassifiedQuery, Destination, QueryIntent};
use wayfind_core::TransportMode;

use crate::rules;

/// Normalizes a draft classification against the raw query text.
///
/// Invariants, in order:
/// 1. Marker-relative primary/secondary swap — the category the user names
///    as "what I want" becomes primary, the landmark becomes secondary.
///    Best-effort substring positioning; skipped for enroute, whose
///    primary/destination roles are independent of marker order.
/// 2. A secondary category forces `find-near-poi` and triggers extraction
///    of a cuisine token embedded in the query text.
/// 3. An enroute cue plus a destination forces `find-enroute`, overriding
///    conflicting draft output.
/// 4. Absent transport defaults to walking.
/// 5. Sanity pass: when the rule engine reads the text as enroute or
///    clarification and the draft disagrees, the draft is discarded for the
///    rule result at override confidence.
#[must_use]
pub fn finalize(draft: ClassifiedQuery, text: &str, table: &CategoryTable) -> ClassifiedQuery {
    let lower = text.to_lowercase();
    let mut intent = draft.intent;
    let mut entities = draft.entities;

    // Primary/secondary swap when word order disagrees with the marker.
    if intent != QueryIntent::FindEnroute {
        if let (Some(primary), Some(secondary), Some(marker)) = (
            entities.primary_poi,
            entities.secondary_poi,
            rules::locative_marker_position(&lower),
        ) {
            let primary_pos = rules::category_position(&lower, primary, table);
            let secondary_pos = rules::category_position(&lower, secondary, table);
            if let (Some(p), Some(s)) = (primary_pos, secondary_pos) {
                if p > marker && s < marker {
                    entities.primary_poi = Some(secondary);
                    entities.secondary_poi = Some(primary);
                }
            }
        }
    }

    // A landmark category means a compound search.
    if entities.secondary_poi.is_some() && intent != QueryIntent::FindEnroute {
        intent = QueryIntent::FindNearPoi;
        if entities.cuisine.is_none() {
            entities.cuisine = table.find_cuisine(&lower).map(ToOwned::to_owned);
        }
    }

    // Enroute cue plus destination wins over whatever the draft said.
    if rules::has_enroute_cue(&lower) {
        let destination = entities
            .destination
            .take()
            .or_else(|| rules::extract_destination(&lower).map(Destination::Text));
        if let Some(destination) = destination {
            intent = QueryIntent::FindEnroute;
            entities.destination = Some(destination);
        }
    }

    if entities.transport.is_none() {
        entities.transport = Some(TransportMode::Walking);
    }

    let result = ClassifiedQuery::new(
        intent,
        entities,
        draft.confidence,
        draft.reasoning,
        draft.source,
    );

    // Trusted override: the rule engine's reading of enroute/clarification
    // cues beats the draft when they disagree.
    let rules_view = rules::rule_classify(text, table);
    let disagrees = (rules_view.intent == QueryIntent::FindEnroute
        && result.intent != QueryIntent::FindEnroute)
        || (rules_view.intent == QueryIntent::Clarification
            && result.intent != QueryIntent::Clarification);
    if disagrees {
        tracing::debug!(
            draft_intent = %result.intent,
            rules_intent = %rules_view.intent,
            "sanity pass disagreement, substituting rule override"
        );
        let mut overridden = rules::rule_override(text, table);
        if overridden.entities.transport.is_none() {
            overridden.entities.transport = Some(TransportMode::Walking);
        }
        return overridden;
    }

    result
}
