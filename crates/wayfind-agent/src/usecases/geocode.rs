//! Geocoding use case with progressive context fallbacks.

use serde_json::json;

use wayfind_core::{Location, UseCaseOutput, UseCaseResult};
use wayfind_places::GeocodeClient;

use super::geocoding_failed;

/// Regional context appended to under-specified destination text.
#[derive(Debug, Clone)]
pub struct GeocodeContext {
    pub city: String,
    pub state: String,
    pub country_code: String,
}

/// Thin pass-through geocode: resolve `text` or fail.
///
/// # Errors
///
/// `GEOCODING_FAILED` when the collaborator errors or finds nothing.
pub async fn geocode_location(
    client: &GeocodeClient,
    text: &str,
    country_code: Option<&str>,
) -> UseCaseResult<Location> {
    if text.trim().is_empty() {
        return Err(wayfind_core::UseCaseError::missing_field("text"));
    }
    match client.geocode(text, country_code).await {
        Ok(Some(location)) => Ok(UseCaseOutput::new(location)),
        Ok(None) => Err(geocoding_failed(format!("no results for '{text}'"))),
        Err(e) => Err(geocoding_failed(e.to_string())),
    }
}

/// Builds the ordered list of geocoding attempts for a destination string.
///
/// Raw text first, then progressively more regional context, plus
/// "downtown <city>" variants when the text mentions downtown. Duplicates
/// are removed while preserving order.
fn attempts_for(text: &str, context: &GeocodeContext) -> Vec<String> {
    let trimmed = text.trim();
    let mut attempts = vec![
        trimmed.to_string(),
        format!("{trimmed}, {}, {}", context.city, context.state),
        format!("{trimmed}, {}", context.city),
    ];
    if trimmed.to_lowercase().contains("downtown") {
        attempts.push(format!("downtown {}", context.city));
        attempts.push(format!("downtown, {}, {}", context.city, context.state));
    }
    let mut seen = std::collections::HashSet::new();
    attempts.retain(|a| seen.insert(a.to_lowercase()));
    attempts
}

/// Resolves a destination with progressively more context until one attempt
/// succeeds.
///
/// Individual attempt failures (service errors included) are logged and the
/// next attempt is tried; metadata records which attempt won.
///
/// # Errors
///
/// `GEOCODING_FAILED` with the attempted queries in `details` when every
/// attempt comes up empty.
pub async fn geocode_with_fallbacks(
    client: &GeocodeClient,
    text: &str,
    context: &GeocodeContext,
) -> UseCaseResult<Location> {
    if text.trim().is_empty() {
        return Err(wayfind_core::UseCaseError::missing_field("destination"));
    }

    let attempts = attempts_for(text, context);
    for (index, attempt) in attempts.iter().enumerate() {
        match client.geocode(attempt, Some(&context.country_code)).await {
            Ok(Some(location)) => {
                return Ok(UseCaseOutput::with_metadata(
                    location,
                    json!({ "attempt": attempt, "attempt_index": index }),
                ));
            }
            Ok(None) => {
                tracing::debug!(attempt = %attempt, "geocode attempt found nothing");
            }
            Err(e) => {
                tracing::warn!(attempt = %attempt, error = %e, "geocode attempt failed");
            }
        }
    }

    Err(
        geocoding_failed(format!("could not resolve destination '{text}'"))
            .with_details(json!({ "attempts": attempts })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> GeocodeContext {
        GeocodeContext {
            city: "Houston".to_string(),
            state: "TX".to_string(),
            country_code: "us".to_string(),
        }
    }

    #[test]
    fn attempts_escalate_context() {
        let attempts = attempts_for("main street", &context());
        assert_eq!(
            attempts,
            vec![
                "main street".to_string(),
                "main street, Houston, TX".to_string(),
                "main street, Houston".to_string(),
            ]
        );
    }

    #[test]
    fn downtown_text_adds_downtown_variants() {
        let attempts = attempts_for("downtown", &context());
        assert!(attempts.contains(&"downtown Houston".to_string()));
        assert!(attempts.contains(&"downtown, Houston, TX".to_string()));
    }

    #[test]
    fn attempts_are_deduplicated() {
        let attempts = attempts_for("Downtown Houston", &context());
        let lowered: Vec<String> = attempts.iter().map(|a| a.to_lowercase()).collect();
        let unique: std::collections::HashSet<&String> = lowered.iter().collect();
        assert_eq!(unique.len(), lowered.len(), "duplicates in {attempts:?}");
    }
}
