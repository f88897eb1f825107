//! Integration tests for `RoutingClient` using wiremock HTTP mocks.

use wayfind_core::geo::Coord;
use wayfind_core::location::TransportMode;
use wayfind_routing::normalize::pick_best_route;
use wayfind_routing::{
    OptimizationJob, OptimizationVehicle, RouteOptions, RoutingClient, RoutingError,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RoutingClient {
    RoutingClient::with_base_url(Some("test-key"), 30, "wayfind/test", base_url)
        .expect("client construction should not fail")
}

const HOUSTON: Coord = Coord {
    lat: 29.7604,
    lng: -95.3698,
};

fn isochrone_body() -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "bbox": [-95.40, 29.72, -95.33, 29.80],
        "features": [{
            "type": "Feature",
            "properties": { "value": 900.0 },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-95.40, 29.72], [-95.33, 29.72], [-95.33, 29.80], [-95.40, 29.80], [-95.40, 29.72]
                ]]
            }
        }]
    })
}

#[tokio::test]
async fn get_isochrone_returns_parsed_polygons() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/foot-walking"))
        .and(body_partial_json(serde_json::json!({
            "range": [900],
            "range_type": "time"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(isochrone_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let iso = client
        .get_isochrone(HOUSTON, TransportMode::Walking, &[900])
        .await
        .expect("should parse isochrone");

    assert_eq!(iso.polygons.len(), 1);
    assert_eq!(iso.polygons[0].len(), 5);
    assert!((iso.range_minutes - 15.0).abs() < 1e-9);
    assert!((iso.bbox.min_lng + 95.40).abs() < 1e-9);
    assert_eq!(iso.mode, TransportMode::Walking);
}

#[tokio::test]
async fn get_isochrone_surfaces_api_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/driving-car"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 3002, "message": "range exceeds limit" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .get_isochrone(HOUSTON, TransportMode::Driving, &[999_999])
        .await
        .unwrap_err();

    match err {
        RoutingError::ApiError(message) => {
            assert!(message.contains("range exceeds limit"), "got: {message}");
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn get_isochrone_retries_on_500_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/foot-walking"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/foot-walking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(isochrone_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let iso = client
        .get_isochrone(HOUSTON, TransportMode::Walking, &[900])
        .await
        .expect("retry should recover from a transient 500");

    assert_eq!(iso.polygons.len(), 1);
}

#[tokio::test]
async fn get_directions_picks_lowest_duration_alternative() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "summary": { "distance": 5000.0, "duration": 900.0 } },
                "geometry": { "type": "LineString",
                    "coordinates": [[-95.3698, 29.7604], [-95.3500, 29.7700]] }
            },
            {
                "type": "Feature",
                "properties": { "summary": { "distance": 4200.0, "duration": 720.0 } },
                "geometry": { "type": "LineString",
                    "coordinates": [[-95.3698, 29.7604], [-95.3550, 29.7650]] }
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v2/directions/driving-car/geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let routes = client
        .get_directions(
            &[HOUSTON, Coord::new(29.77, -95.35)],
            TransportMode::Driving,
            &RouteOptions {
                elevation: false,
                alternatives: true,
            },
        )
        .await
        .expect("should parse directions");

    assert_eq!(routes.len(), 2);
    let best = pick_best_route(routes).unwrap();
    assert!((best.duration_min - 12.0).abs() < 1e-9);
    assert!((best.distance_m - 4200.0).abs() < 1e-9);
}

#[tokio::test]
async fn get_directions_rejects_single_coordinate() {
    let client = test_client("http://localhost:9");
    let err = client
        .get_directions(&[HOUSTON], TransportMode::Walking, &RouteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RoutingError::ApiError(_)));
}

#[tokio::test]
async fn get_matrix_parses_durations_and_distances() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "durations": [[0.0, 300.0], [310.0, 0.0]],
        "distances": [[0.0, 2100.0], [2150.0, 0.0]]
    });

    Mock::given(method("POST"))
        .and(path("/v2/matrix/foot-walking"))
        .and(body_partial_json(serde_json::json!({
            "metrics": ["duration", "distance"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let matrix = client
        .get_matrix(
            &[HOUSTON, Coord::new(29.77, -95.35)],
            TransportMode::Walking,
            &["duration", "distance"],
        )
        .await
        .expect("should parse matrix");

    assert_eq!(matrix.durations.len(), 2);
    assert_eq!(matrix.durations[0][1], Some(300.0));
    assert_eq!(matrix.distances[1][0], Some(2150.0));
}

#[tokio::test]
async fn optimize_parses_routes_and_unassigned() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "code": 0,
        "routes": [{
            "vehicle": 1,
            "duration": 1500.0,
            "steps": [
                { "type": "start" },
                { "type": "job", "job": 1, "arrival": 700.0 },
                { "type": "end", "arrival": 1500.0 }
            ]
        }],
        "unassigned": [{ "id": 2 }]
    });

    Mock::given(method("POST"))
        .and(path("/optimization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let jobs = vec![
        OptimizationJob {
            id: 1,
            location: [-95.36, 29.77],
            service: None,
        },
        OptimizationJob {
            id: 2,
            location: [-95.20, 29.60],
            service: None,
        },
    ];
    let vehicles = vec![OptimizationVehicle {
        id: 1,
        profile: "driving-car".to_string(),
        start: [-95.3698, 29.7604],
        end: [-95.30, 29.75],
    }];

    let result = client
        .optimize(&jobs, &vehicles)
        .await
        .expect("should parse optimization result");

    assert_eq!(result.routes.len(), 1);
    assert!((result.total_duration_secs() - 1500.0).abs() < 1e-9);
    assert_eq!(result.unassigned.len(), 1);
    assert_eq!(result.unassigned[0].id, 2);
}

#[tokio::test]
async fn optimize_nonzero_code_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/optimization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 3,
            "error": "no solution found"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.optimize(&[], &[]).await.unwrap_err();
    match err {
        RoutingError::ApiError(message) => assert!(message.contains("no solution found")),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}
