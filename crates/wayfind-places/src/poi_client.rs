//! Overpass-backed POI search.
//!
//! Builds a bbox-scoped Overpass QL query for one category, parses the
//! element list, and normalizes nodes/ways into [`Poi`] values. Zero matches
//! is an ordinary empty result, never an error.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use wayfind_core::geo::BoundingBox;
use wayfind_core::poi::{Poi, PoiCategory};

use crate::error::PlacesError;
use crate::osm_tags;

/// Parameters for one bbox-scoped category search.
#[derive(Debug, Clone)]
pub struct PoiSearch {
    pub category: PoiCategory,
    pub bounds: BoundingBox,
    pub cuisine: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

/// Client for an Overpass API endpoint.
pub struct PoiClient {
    client: Client,
    endpoint: String,
}

impl PoiClient {
    /// Creates a client for the given Overpass interpreter endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Searches for POIs of one category inside a bounding box.
    ///
    /// Unnamed elements are dropped unless the category tolerates them
    /// (parks, parking, ATMs), in which case a generic name is substituted.
    /// Results are truncated to `max_results`; an empty list is a normal
    /// outcome.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiError`] on a non-success HTTP status.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] when the body is not an element list.
    pub async fn find_pois(&self, search: &PoiSearch) -> Result<Vec<Poi>, PlacesError> {
        let query = build_query(search);
        tracing::debug!(category = %search.category, query = %query, "overpass query");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError(format!(
                "overpass returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await?;
        let parsed: OverpassResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: format!("overpass({})", search.category),
                source: e,
            })?;

        let mut pois: Vec<Poi> = parsed
            .elements
            .into_iter()
            .filter_map(|el| element_to_poi(el, search.category))
            .collect();
        pois.truncate(search.max_results);
        Ok(pois)
    }
}

/// Renders the Overpass QL query for a search.
///
/// Overpass bbox order is `(south, west, north, east)`. Ways are included
/// with `out center` so area features (parks, hospitals) get a point.
fn build_query(search: &PoiSearch) -> String {
    let (key, value) = osm_tags::selector(search.category);
    let b = &search.bounds;
    let bbox = format!(
        "({},{},{},{})",
        b.min_lat, b.min_lng, b.max_lat, b.max_lng
    );
    let cuisine_filter = search
        .cuisine
        .as_deref()
        .map(|c| format!("[\"cuisine\"~\"{}\",i]", escape_regex(c)))
        .unwrap_or_default();

    format!(
        "[out:json][timeout:25];\n(\n  node[\"{key}\"=\"{value}\"]{cuisine_filter}{bbox};\n  way[\"{key}\"=\"{value}\"]{cuisine_filter}{bbox};\n);\nout center {};",
        search.max_results.max(1)
    )
}

/// Escapes regex metacharacters in a cuisine token before it is embedded in
/// an Overpass regex filter.
fn escape_regex(raw: &str) -> String {
    raw.chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                vec![c]
            } else {
                vec!['\\', c]
            }
        })
        .collect()
}

fn element_to_poi(element: OverpassElement, category: PoiCategory) -> Option<Poi> {
    let (lat, lng) = match (element.lat, element.lon, &element.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => return None,
    };

    let name = match element.tags.get("name") {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ if category.tolerates_unnamed() => format!("Unnamed {category}"),
        _ => return None,
    };

    Some(Poi {
        id: format!("{}/{}", element.kind, element.id),
        name,
        category,
        lat,
        lng,
        tags: element.tags,
        distance_m: None,
        travel_time_min: None,
        distance_from_anchor_m: None,
        travel_time_from_anchor_min: None,
    })
}
