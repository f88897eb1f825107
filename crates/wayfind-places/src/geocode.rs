//! Nominatim-backed forward geocoding.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use wayfind_core::location::Location;

use crate::error::PlacesError;

/// One Nominatim search hit. Coordinates arrive as strings on the wire.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Client for a Nominatim search endpoint.
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Creates a client for the given Nominatim deployment.
    ///
    /// Nominatim's usage policy requires an identifying user agent; pass the
    /// application's configured one.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::ApiError`] for an invalid
    /// base URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Resolves free text to a location. The first hit wins; an empty result
    /// list is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiError`] on a non-success HTTP status.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] when the body is not a hit array.
    pub async fn geocode(
        &self,
        text: &str,
        country_code: Option<&str>,
    ) -> Result<Option<Location>, PlacesError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| PlacesError::ApiError(format!("invalid search URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", text);
            pairs.append_pair("format", "json");
            pairs.append_pair("limit", "3");
            if let Some(cc) = country_code {
                pairs.append_pair("countrycodes", cc);
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError(format!(
                "nominatim returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await?;
        let hits: Vec<NominatimHit> =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: format!("nominatim({text})"),
                source: e,
            })?;

        Ok(hits.into_iter().find_map(hit_to_location))
    }
}

/// Drops hits with unparsable coordinates rather than failing the request.
fn hit_to_location(hit: NominatimHit) -> Option<Location> {
    let lat = hit.lat.parse::<f64>().ok()?;
    let lng = hit.lon.parse::<f64>().ok()?;
    Some(Location::named(lat, lng, hit.display_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_with_string_coordinates_parses() {
        let hit = NominatimHit {
            lat: "29.7604".to_string(),
            lon: "-95.3698".to_string(),
            display_name: "Houston, Texas".to_string(),
        };
        let loc = hit_to_location(hit).unwrap();
        assert!((loc.lat - 29.7604).abs() < 1e-9);
        assert_eq!(loc.display_name.as_deref(), Some("Houston, Texas"));
    }

    #[test]
    fn hit_with_garbage_coordinates_is_skipped() {
        let hit = NominatimHit {
            lat: "not-a-number".to_string(),
            lon: "-95.3698".to_string(),
            display_name: String::new(),
        };
        assert!(hit_to_location(hit).is_none());
    }
}
