//! Classification prompt construction.

use wayfind_core::poi::PoiCategory;
use wayfind_core::query::ConversationTurn;

/// Prior turns included in the prompt; older turns are dropped.
const MAX_CONTEXT_TURNS: usize = 3;

/// Builds the fixed-schema classification prompt for one query.
///
/// The schema mirrors the wire struct in [`crate::classifier`]; the reply is
/// parsed leniently, so drift in the model's formatting is tolerated.
#[must_use]
pub fn classification_prompt(text: &str, context: &[ConversationTurn]) -> String {
    let categories = PoiCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::from(
        "You classify place-finding queries for a map assistant. \
         Reply with a single JSON object and nothing else, using this schema:\n\
         {\n\
           \"intent\": \"find-nearest\" | \"find-within-time\" | \"find-near-poi\" | \"find-enroute\" | \"get-directions\" | \"follow-up\" | \"clarification\",\n\
           \"primary_poi\": string | null,\n\
           \"secondary_poi\": string | null,\n\
           \"transport\": \"walking\" | \"driving\" | \"cycling\" | \"public_transport\" | null,\n\
           \"time_constraint_min\": number | null,\n\
           \"destination\": string | null,\n\
           \"cuisine\": string | null,\n\
           \"keywords\": [string],\n\
           \"confidence\": number,\n\
           \"reasoning\": string\n\
         }\n\n",
    );
    prompt.push_str(&format!("POI categories: {categories}.\n"));
    prompt.push_str(
        "Rules: primary_poi is what the user wants to find; secondary_poi is a \
         landmark used as a reference (\"coffee near a park\" => primary cafe, \
         secondary park). Use find-enroute only when the user is traveling to a \
         destination and wants a stop on the way. Use clarification when the \
         request is too vague to act on.\n\n",
    );

    if !context.is_empty() {
        prompt.push_str("Conversation so far:\n");
        let skip = context.len().saturating_sub(MAX_CONTEXT_TURNS);
        for turn in &context[skip..] {
            prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("Query: {text}\n"));
    prompt
}
