//! Deterministic rule-based classification.
//!
//! Keyword and regex matching over the lowercased query text. This stage is
//! the fallback when the LLM collaborator is unavailable (confidence 0.6)
//! and the trusted override when the sanity pass catches the LLM
//! contradicting an unambiguous textual cue (confidence 0.9).

use std::sync::LazyLock;

use regex::Regex;

use wayfind_core::categories::CategoryTable;
use wayfind_core::poi::PoiCategory;
use wayfind_core::query::{
    ClassificationSource, ClassifiedQuery, Destination, QueryEntities, QueryIntent,
};
use wayfind_core::TransportMode;

/// Confidence assigned when this stage runs as the LLM fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Confidence assigned when this stage overrides a contradicted LLM result.
pub const OVERRIDE_CONFIDENCE: f64 = 0.9;

static TIME_MIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:minutes?|mins?)\b").expect("time-minutes regex must compile")
});
static TIME_HOUR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:hours?|hrs?)\b").expect("time-hours regex must compile")
});
static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:on (?:the|my) way to|before going to|going to|heading to|way to|get to|to)\s+(.+?)(?:\s+(?:in|within)\s+\d+.*)?$",
    )
    .expect("destination regex must compile")
});

const ENROUTE_CUES: &[&str] = &[
    "on the way",
    "on my way",
    "en route",
    "enroute",
    "along the way",
    "before going",
    "before i get",
];

const FOLLOWUP_CUES: &[&str] = &[
    "what about",
    "how about",
    "which one",
    "the first one",
    "the second one",
    "any other",
    "more options",
];

const DIRECTIONS_CUES: &[&str] = &[
    "directions to",
    "route to",
    "navigate to",
    "how do i get to",
    "take me to",
];

const LOCATIVE_MARKERS: &[&str] = &["near", "close to", "around", "by"];

const NEAREST_CUES: &[&str] = &["nearest", "closest"];

/// Position of `needle` in `haystack` constrained to word boundaries.
///
/// Plain substring search with boundary checks — "near" does not match
/// inside "nearest" or "nearby".
#[must_use]
pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = haystack[start..].find(needle) {
        let abs = start + rel;
        let before_ok = !haystack[..abs]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let after_ok = !haystack[abs + needle.len()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return Some(abs);
        }
        start = abs + needle.len().max(1);
    }
    None
}

fn first_cue(lower: &str, cues: &[&str]) -> Option<usize> {
    cues.iter().filter_map(|cue| find_word(lower, cue)).min()
}

/// Leftmost locative marker ("near", "close to", "around", "by"), if any.
#[must_use]
pub fn locative_marker_position(lower: &str) -> Option<usize> {
    first_cue(lower, LOCATIVE_MARKERS)
}

#[must_use]
pub fn has_enroute_cue(lower: &str) -> bool {
    first_cue(lower, ENROUTE_CUES).is_some()
}

/// `find_word` that also accepts a naive plural of the phrase.
fn find_phrase(haystack: &str, phrase: &str) -> Option<usize> {
    let exact = find_word(haystack, phrase);
    let plural = find_word(haystack, &format!("{phrase}s"));
    match (exact, plural) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Leftmost text position of any phrase resolving to `category`.
///
/// Best-effort substring positioning: multi-word phrases and overlapping
/// synonyms can disagree with what the user meant, which is accepted.
#[must_use]
pub fn category_position(lower: &str, category: PoiCategory, table: &CategoryTable) -> Option<usize> {
    table
        .phrases()
        .filter(|&(_, c)| c == category)
        .filter_map(|(phrase, _)| find_phrase(lower, phrase))
        .min()
}

/// All categories mentioned in the text, leftmost occurrence first.
#[must_use]
pub fn categories_in_text(lower: &str, table: &CategoryTable) -> Vec<(usize, PoiCategory)> {
    let mut found: Vec<(usize, PoiCategory)> = PoiCategory::ALL
        .iter()
        .filter_map(|&c| category_position(lower, c, table).map(|pos| (pos, c)))
        .collect();
    found.sort_by_key(|&(pos, _)| pos);
    found
}

fn detect_transport(lower: &str) -> Option<TransportMode> {
    let groups: &[(&[&str], TransportMode)] = &[
        (&["walk", "walking", "on foot"], TransportMode::Walking),
        (&["drive", "driving", "car"], TransportMode::Driving),
        (
            &["bike", "biking", "cycle", "cycling", "bicycle"],
            TransportMode::Cycling,
        ),
        (
            &["bus", "train", "transit", "subway", "metro"],
            TransportMode::PublicTransport,
        ),
    ];
    groups
        .iter()
        .filter_map(|(words, mode)| first_cue(lower, words).map(|pos| (pos, *mode)))
        .min_by_key(|&(pos, _)| pos)
        .map(|(_, mode)| mode)
}

fn detect_time_constraint(lower: &str) -> Option<f64> {
    if let Some(caps) = TIME_MIN_RE.captures(lower) {
        return caps[1].parse::<f64>().ok();
    }
    if let Some(caps) = TIME_HOUR_RE.captures(lower) {
        return caps[1].parse::<f64>().ok().map(|h| h * 60.0);
    }
    None
}

/// Destination text after a travel cue, trimmed of trailing time phrases
/// and punctuation.
#[must_use]
pub fn extract_destination(lower: &str) -> Option<String> {
    let caps = DESTINATION_RE.captures(lower)?;
    let dest = caps[1].trim().trim_end_matches(['.', '!', '?', ',']).trim();
    if dest.is_empty() {
        return None;
    }
    Some(dest.to_string())
}

/// Classifies a query with keyword rules alone.
///
/// Always succeeds; queries with no recognizable signal come back as
/// `clarification`.
#[must_use]
pub fn rule_classify(text: &str, table: &CategoryTable) -> ClassifiedQuery {
    classify_with_confidence(text, table, FALLBACK_CONFIDENCE, ClassificationSource::RuleFallback)
}

/// Rule classification at override confidence, tagged as an override.
#[must_use]
pub fn rule_override(text: &str, table: &CategoryTable) -> ClassifiedQuery {
    classify_with_confidence(text, table, OVERRIDE_CONFIDENCE, ClassificationSource::RuleOverride)
}

fn classify_with_confidence(
    text: &str,
    table: &CategoryTable,
    confidence: f64,
    source: ClassificationSource,
) -> ClassifiedQuery {
    let lower = text.to_lowercase();

    let categories = categories_in_text(&lower, table);
    let transport = detect_transport(&lower);
    let time_constraint = detect_time_constraint(&lower);
    let cuisine = table.find_cuisine(&lower).map(ToOwned::to_owned);
    let marker = locative_marker_position(&lower);

    let primary = categories.first().map(|&(_, c)| c);
    let secondary = match (marker, categories.get(1)) {
        (Some(_), Some(&(_, c))) if Some(c) != primary => Some(c),
        _ => None,
    };

    let mut keywords: Vec<String> = Vec::new();
    for &(_, c) in &categories {
        keywords.push(c.as_str().to_string());
    }
    if let Some(c) = &cuisine {
        keywords.push(c.clone());
    }

    let destination = extract_destination(&lower);
    let enroute = has_enroute_cue(&lower) && destination.is_some();

    let (intent, reason) = if first_cue(&lower, FOLLOWUP_CUES).is_some() {
        (QueryIntent::FollowUp, "follow-up cue".to_string())
    } else if enroute {
        (
            QueryIntent::FindEnroute,
            "enroute cue with destination".to_string(),
        )
    } else if first_cue(&lower, DIRECTIONS_CUES).is_some() {
        (QueryIntent::GetDirections, "directions cue".to_string())
    } else if secondary.is_some() {
        (
            QueryIntent::FindNearPoi,
            "two categories with locative marker".to_string(),
        )
    } else if primary.is_some() && first_cue(&lower, NEAREST_CUES).is_some() {
        (QueryIntent::FindNearest, "nearest cue".to_string())
    } else if primary.is_some() && time_constraint.is_some() {
        (
            QueryIntent::FindWithinTime,
            "category with time constraint".to_string(),
        )
    } else if primary.is_some() {
        (QueryIntent::FindNearest, "category only".to_string())
    } else {
        (
            QueryIntent::Clarification,
            "no recognizable place-finding signal".to_string(),
        )
    };

    let entities = QueryEntities {
        primary_poi: primary,
        secondary_poi: secondary,
        transport,
        time_constraint_min: time_constraint,
        destination: if intent == QueryIntent::FindEnroute {
            destination.map(Destination::Text)
        } else {
            None
        },
        cuisine,
        keywords,
    };

    ClassifiedQuery::new(
        intent,
        entities,
        confidence,
        format!("rule engine: {reason}"),
        source,
    )
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
