use super::*;

fn table() -> CategoryTable {
    CategoryTable::builtin()
}

fn classify(text: &str) -> ClassifiedQuery {
    rule_classify(text, &table())
}

#[test]
fn find_word_respects_boundaries() {
    assert_eq!(find_word("near the park", "near"), Some(0));
    assert_eq!(find_word("the nearest park", "near"), None);
    assert_eq!(find_word("nearby places", "near"), None);
    assert_eq!(find_word("walk or drive", "drive"), Some(8));
}

#[test]
fn nearest_cafe_is_find_nearest() {
    let q = classify("find the nearest cafe");
    assert_eq!(q.intent, QueryIntent::FindNearest);
    assert_eq!(q.complexity, wayfind_core::Complexity::Simple);
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Cafe));
    assert!((q.confidence - FALLBACK_CONFIDENCE).abs() < 1e-9);
    assert_eq!(q.source, ClassificationSource::RuleFallback);
}

#[test]
fn coffee_near_hospital_is_near_poi_with_correct_roles() {
    let q = classify("find coffee near the nearest hospital");
    assert_eq!(q.intent, QueryIntent::FindNearPoi);
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Cafe));
    assert_eq!(q.entities.secondary_poi, Some(PoiCategory::Hospital));
}

#[test]
fn within_time_query_extracts_constraint_and_transport() {
    let q = classify("coffee shops within 15 minutes walk");
    assert_eq!(q.intent, QueryIntent::FindWithinTime);
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Cafe));
    assert_eq!(q.entities.transport, Some(TransportMode::Walking));
    assert_eq!(q.entities.time_constraint_min, Some(15.0));
}

#[test]
fn hours_are_converted_to_minutes() {
    let q = classify("restaurants within 1 hour drive");
    assert_eq!(q.entities.time_constraint_min, Some(60.0));
    assert_eq!(q.entities.transport, Some(TransportMode::Driving));
}

#[test]
fn enroute_query_captures_destination() {
    let q = classify("grab coffee on the way to downtown in 30 minutes");
    assert_eq!(q.intent, QueryIntent::FindEnroute);
    assert_eq!(
        q.entities.destination,
        Some(Destination::Text("downtown".to_string()))
    );
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Cafe));
    assert_eq!(q.entities.time_constraint_min, Some(30.0));
}

#[test]
fn enroute_cue_without_destination_is_not_enroute() {
    let q = classify("coffee along the way");
    assert_ne!(q.intent, QueryIntent::FindEnroute);
}

#[test]
fn directions_cue_wins_without_enroute_cue() {
    let q = classify("directions to the airport");
    assert_eq!(q.intent, QueryIntent::GetDirections);
}

#[test]
fn follow_up_cue_is_detected() {
    let q = classify("what about the second one");
    assert_eq!(q.intent, QueryIntent::FollowUp);
    assert!(q.requires_context);
}

#[test]
fn vague_text_is_clarification() {
    let q = classify("hmm, somewhere nice?");
    assert_eq!(q.intent, QueryIntent::Clarification);
    assert!(q.needs_clarification());
}

#[test]
fn brand_token_maps_to_category() {
    let q = classify("nearest starbucks");
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Cafe));
    assert_eq!(q.intent, QueryIntent::FindNearest);
}

#[test]
fn cuisine_is_extracted_alongside_restaurant() {
    let q = classify("find an italian restaurant nearby");
    assert_eq!(q.entities.primary_poi, Some(PoiCategory::Restaurant));
    assert_eq!(q.entities.cuisine.as_deref(), Some("italian"));
}

#[test]
fn classification_is_idempotent() {
    let a = classify("find coffee near the nearest hospital");
    let b = classify("find coffee near the nearest hospital");
    assert_eq!(a.intent, b.intent);
    assert_eq!(a.complexity, b.complexity);
    assert_eq!(a.entities, b.entities);
}

#[test]
fn override_variant_raises_confidence_and_tags_source() {
    let q = rule_override("grab coffee on the way to downtown", &table());
    assert!((q.confidence - OVERRIDE_CONFIDENCE).abs() < 1e-9);
    assert_eq!(q.source, ClassificationSource::RuleOverride);
}
