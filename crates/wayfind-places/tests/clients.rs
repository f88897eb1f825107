//! Integration tests for the POI-search and geocoding clients using
//! wiremock HTTP mocks.

use wayfind_core::geo::BoundingBox;
use wayfind_core::poi::PoiCategory;
use wayfind_places::{GeocodeClient, PlacesError, PoiClient, PoiSearch};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn houston_bounds() -> BoundingBox {
    BoundingBox {
        min_lat: 29.72,
        min_lng: -95.40,
        max_lat: 29.80,
        max_lng: -95.33,
    }
}

#[tokio::test]
async fn find_pois_parses_nodes_and_ways() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "elements": [
            {
                "type": "node",
                "id": 1001,
                "lat": 29.755,
                "lon": -95.365,
                "tags": { "name": "Catalina Coffee", "amenity": "cafe" }
            },
            {
                "type": "way",
                "id": 2002,
                "center": { "lat": 29.748, "lon": -95.372 },
                "tags": { "name": "Siphon Coffee", "amenity": "cafe" }
            },
            {
                "type": "node",
                "id": 3003,
                "lat": 29.760,
                "lon": -95.360,
                "tags": { "amenity": "cafe" }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = PoiClient::new(
        &format!("{}/api/interpreter", server.uri()),
        30,
        "wayfind/test",
    )
    .expect("client construction should not fail");

    let pois = client
        .find_pois(&PoiSearch {
            category: PoiCategory::Cafe,
            bounds: houston_bounds(),
            cuisine: None,
            max_results: 10,
        })
        .await
        .expect("should parse overpass response");

    // The unnamed cafe node is dropped.
    assert_eq!(pois.len(), 2);
    assert_eq!(pois[0].id, "node/1001");
    assert_eq!(pois[0].name, "Catalina Coffee");
    assert_eq!(pois[1].id, "way/2002");
    assert!((pois[1].lat - 29.748).abs() < 1e-9);
}

#[tokio::test]
async fn find_pois_truncates_to_max_results() {
    let server = MockServer::start().await;

    let elements: Vec<serde_json::Value> = (0..8)
        .map(|i| {
            serde_json::json!({
                "type": "node",
                "id": i,
                "lat": 29.75,
                "lon": -95.36,
                "tags": { "name": format!("Cafe {i}") }
            })
        })
        .collect();

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "elements": elements })),
        )
        .mount(&server)
        .await;

    let client = PoiClient::new(&server.uri(), 30, "wayfind/test").unwrap();
    let pois = client
        .find_pois(&PoiSearch {
            category: PoiCategory::Cafe,
            bounds: houston_bounds(),
            cuisine: None,
            max_results: 3,
        })
        .await
        .unwrap();

    assert_eq!(pois.len(), 3);
}

#[tokio::test]
async fn find_pois_empty_elements_is_ok_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "elements": [] })),
        )
        .mount(&server)
        .await;

    let client = PoiClient::new(&server.uri(), 30, "wayfind/test").unwrap();
    let pois = client
        .find_pois(&PoiSearch {
            category: PoiCategory::Pharmacy,
            bounds: houston_bounds(),
            cuisine: None,
            max_results: 10,
        })
        .await
        .unwrap();

    assert!(pois.is_empty());
}

#[tokio::test]
async fn find_pois_surfaces_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = PoiClient::new(&server.uri(), 30, "wayfind/test").unwrap();
    let err = client
        .find_pois(&PoiSearch {
            category: PoiCategory::Cafe,
            bounds: houston_bounds(),
            cuisine: None,
            max_results: 10,
        })
        .await
        .unwrap_err();

    match err {
        PlacesError::ApiError(message) => assert!(message.contains("429"), "got: {message}"),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn geocode_returns_first_hit() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "lat": "29.7604",
            "lon": "-95.3698",
            "display_name": "Downtown, Houston, Harris County, Texas"
        },
        {
            "lat": "29.5",
            "lon": "-95.1",
            "display_name": "Somewhere else"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "downtown houston"))
        .and(query_param("format", "json"))
        .and(query_param("countrycodes", "us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = GeocodeClient::new(&server.uri(), 5, "wayfind/test").unwrap();
    let location = client
        .geocode("downtown houston", Some("us"))
        .await
        .expect("request should succeed")
        .expect("should resolve a location");

    assert!((location.lat - 29.7604).abs() < 1e-9);
    assert!(location
        .display_name
        .as_deref()
        .unwrap()
        .starts_with("Downtown"));
}

#[tokio::test]
async fn geocode_empty_result_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = GeocodeClient::new(&server.uri(), 5, "wayfind/test").unwrap();
    let location = client.geocode("nowhere at all", None).await.unwrap();
    assert!(location.is_none());
}

#[tokio::test]
async fn geocode_malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let client = GeocodeClient::new(&server.uri(), 5, "wayfind/test").unwrap();
    let err = client.geocode("houston", None).await.unwrap_err();
    assert!(matches!(err, PlacesError::Deserialize { .. }));
}
