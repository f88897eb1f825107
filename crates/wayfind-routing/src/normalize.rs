//! Normalization of routing-service wire types into domain types.

use serde_json::Value;

use wayfind_core::geo::{BoundingBox, Coord};
use wayfind_core::location::TransportMode;
use wayfind_core::poi::Isochrone;
use wayfind_core::route::{RouteInfo, RouteStep};

use crate::error::RoutingError;
use crate::types::{Feature, FeatureCollection, RouteSegment, RouteSummary};

/// A `[lng, lat]` or `[lng, lat, ele]` wire position.
fn parse_position(value: &Value) -> Option<(f64, f64, Option<f64>)> {
    let arr = value.as_array()?;
    let lng = arr.first()?.as_f64()?;
    let lat = arr.get(1)?.as_f64()?;
    let ele = arr.get(2).and_then(Value::as_f64);
    Some((lng, lat, ele))
}

fn parse_line(value: &Value) -> Vec<(f64, f64, Option<f64>)> {
    value
        .as_array()
        .map(|positions| positions.iter().filter_map(parse_position).collect())
        .unwrap_or_default()
}

/// Builds an [`Isochrone`] from an isochrone FeatureCollection.
///
/// Takes the outer ring of every polygon feature; inner rings (holes) are
/// rare in reachability polygons and ignored. The response-level bbox is
/// used when present, otherwise one is computed from the rings.
///
/// A response whose polygons cannot be parsed but which carries a usable
/// bbox still succeeds, with an empty polygon set — callers degrade to
/// bbox-only filtering in that case.
///
/// # Errors
///
/// Returns [`RoutingError::EmptyResponse`] when neither a polygon ring nor
/// a bbox can be extracted.
pub fn isochrone_from_response(
    fc: &FeatureCollection,
    mode: TransportMode,
    range_minutes: f64,
    center: Coord,
) -> Result<Isochrone, RoutingError> {
    let mut polygons: Vec<Vec<Coord>> = Vec::new();
    for feature in &fc.features {
        if feature.geometry.kind != "Polygon" {
            continue;
        }
        let rings = feature.geometry.coordinates.as_array();
        let Some(outer) = rings.and_then(|r| r.first()) else {
            continue;
        };
        let ring: Vec<Coord> = parse_line(outer)
            .into_iter()
            .map(|(lng, lat, _)| Coord::new(lat, lng))
            .collect();
        if ring.len() >= 3 {
            polygons.push(ring);
        }
    }

    let bbox = wire_bbox(fc.bbox.as_deref()).or_else(|| {
        let all: Vec<Coord> = polygons.iter().flatten().copied().collect();
        BoundingBox::from_points(&all)
    });
    let Some(bbox) = bbox else {
        return Err(RoutingError::EmptyResponse(
            "isochrone response had neither polygon rings nor a bbox".to_string(),
        ));
    };

    if polygons.is_empty() {
        tracing::warn!(%mode, range_minutes, "isochrone polygons unparsable, bbox only");
    }

    Ok(Isochrone {
        polygons,
        bbox,
        mode,
        range_minutes,
        center,
    })
}

/// `[min_lng, min_lat, max_lng, max_lat]` → [`BoundingBox`].
fn wire_bbox(raw: Option<&[f64]>) -> Option<BoundingBox> {
    let raw = raw?;
    if raw.len() < 4 {
        return None;
    }
    Some(BoundingBox {
        min_lng: raw[0],
        min_lat: raw[1],
        max_lng: raw[2],
        max_lat: raw[3],
    })
}

/// Converts every LineString feature of a directions response into a
/// [`RouteInfo`].
///
/// # Errors
///
/// Returns [`RoutingError::EmptyResponse`] when the collection holds no
/// usable route feature.
pub fn routes_from_response(fc: &FeatureCollection) -> Result<Vec<RouteInfo>, RoutingError> {
    let routes: Vec<RouteInfo> = fc
        .features
        .iter()
        .filter(|f| f.geometry.kind == "LineString")
        .map(route_from_feature)
        .collect();

    if routes.is_empty() {
        return Err(RoutingError::EmptyResponse(
            "directions response contained no routes".to_string(),
        ));
    }
    Ok(routes)
}

fn route_from_feature(feature: &Feature) -> RouteInfo {
    let positions = parse_line(&feature.geometry.coordinates);
    let geometry: Vec<Coord> = positions
        .iter()
        .map(|&(lng, lat, _)| Coord::new(lat, lng))
        .collect();

    let summary: RouteSummary = feature
        .properties
        .get("summary")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or(RouteSummary {
            distance: 0.0,
            duration: 0.0,
        });

    let steps = feature
        .properties
        .get("segments")
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(|s| serde_json::from_value::<RouteSegment>(s.clone()).ok())
                .flat_map(|s| s.steps)
                .map(|s| RouteStep {
                    instruction: s.instruction,
                    distance_m: s.distance,
                    duration_min: s.duration / 60.0,
                })
                .collect()
        })
        .unwrap_or_default();

    let warnings = feature
        .properties
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| {
            ws.iter()
                .filter_map(|w| {
                    w.get("message")
                        .and_then(Value::as_str)
                        .map(ToOwned::to_owned)
                })
                .collect()
        })
        .unwrap_or_default();

    let (elevation_gain_m, elevation_loss_m) = elevation_from_positions(&positions);
    let duration_min = summary.duration / 60.0;
    let avg_speed_kmh = if summary.duration > 0.0 {
        Some(summary.distance / 1000.0 / (summary.duration / 3600.0))
    } else {
        None
    };

    RouteInfo {
        distance_m: summary.distance,
        duration_min,
        geometry,
        steps,
        warnings,
        elevation_gain_m,
        elevation_loss_m,
        avg_speed_kmh,
    }
}

/// Sums positive and negative elevation deltas along 3-d geometry.
///
/// Returns `(None, None)` when fewer than two positions carry elevation —
/// the collaborator was asked for 2-d geometry or doesn't support it.
fn elevation_from_positions(positions: &[(f64, f64, Option<f64>)]) -> (Option<f64>, Option<f64>) {
    let elevations: Vec<f64> = positions.iter().filter_map(|p| p.2).collect();
    if elevations.len() < 2 {
        return (None, None);
    }
    let mut gain = 0.0;
    let mut loss = 0.0;
    for pair in elevations.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss -= delta;
        }
    }
    (Some(gain), Some(loss))
}

/// Lowest-duration route among alternatives.
#[must_use]
pub fn pick_best_route(routes: Vec<RouteInfo>) -> Option<RouteInfo> {
    routes.into_iter().min_by(|a, b| {
        a.duration_min
            .partial_cmp(&b.duration_min)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_feature(props: Value, coords: Value) -> Feature {
        Feature {
            properties: props,
            geometry: crate::types::Geometry {
                kind: "LineString".to_string(),
                coordinates: coords,
            },
        }
    }

    #[test]
    fn route_summary_and_steps_are_normalized() {
        let feature = line_feature(
            serde_json::json!({
                "summary": {"distance": 1800.0, "duration": 600.0},
                "segments": [{"steps": [
                    {"instruction": "Head north", "distance": 900.0, "duration": 300.0},
                    {"instruction": "Arrive", "distance": 900.0, "duration": 300.0}
                ]}]
            }),
            serde_json::json!([[-95.37, 29.76], [-95.36, 29.77]]),
        );
        let route = route_from_feature(&feature);
        assert!((route.duration_min - 10.0).abs() < 1e-9);
        assert!((route.distance_m - 1800.0).abs() < 1e-9);
        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.geometry.len(), 2);
        // lat/lng flipped from wire order
        assert!((route.geometry[0].lat - 29.76).abs() < 1e-9);
        let speed = route.avg_speed_kmh.unwrap();
        assert!((speed - 10.8).abs() < 0.01, "got {speed}");
    }

    #[test]
    fn elevation_derived_from_3d_geometry() {
        let feature = line_feature(
            serde_json::json!({"summary": {"distance": 100.0, "duration": 60.0}}),
            serde_json::json!([[-95.37, 29.76, 10.0], [-95.36, 29.77, 25.0], [-95.35, 29.78, 20.0]]),
        );
        let route = route_from_feature(&feature);
        assert!((route.elevation_gain_m.unwrap() - 15.0).abs() < 1e-9);
        assert!((route.elevation_loss_m.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn elevation_absent_for_2d_geometry() {
        let feature = line_feature(
            serde_json::json!({}),
            serde_json::json!([[-95.37, 29.76], [-95.36, 29.77]]),
        );
        let route = route_from_feature(&feature);
        assert!(route.elevation_gain_m.is_none());
        assert!(route.elevation_loss_m.is_none());
    }

    #[test]
    fn best_route_is_lowest_duration() {
        let mk = |duration_min: f64| RouteInfo {
            distance_m: 1000.0,
            duration_min,
            geometry: vec![],
            steps: vec![],
            warnings: vec![],
            elevation_gain_m: None,
            elevation_loss_m: None,
            avg_speed_kmh: None,
        };
        let best = pick_best_route(vec![mk(12.0), mk(8.0), mk(10.0)]).unwrap();
        assert!((best.duration_min - 8.0).abs() < 1e-9);
    }

    #[test]
    fn isochrone_with_nothing_usable_is_an_error() {
        let fc = FeatureCollection {
            bbox: None,
            features: vec![],
        };
        let err = isochrone_from_response(
            &fc,
            TransportMode::Walking,
            15.0,
            Coord::new(29.76, -95.37),
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::EmptyResponse(_)));
    }

    #[test]
    fn isochrone_with_bbox_but_no_polygons_degrades_to_bbox_only() {
        let fc = FeatureCollection {
            bbox: Some(vec![-95.40, 29.70, -95.30, 29.80]),
            features: vec![],
        };
        let iso = isochrone_from_response(
            &fc,
            TransportMode::Walking,
            15.0,
            Coord::new(29.76, -95.37),
        )
        .unwrap();
        assert!(iso.polygons.is_empty());
        assert!((iso.bbox.max_lng + 95.30).abs() < 1e-9);
    }

    #[test]
    fn isochrone_uses_wire_bbox_and_flips_ring_order() {
        let fc = FeatureCollection {
            bbox: Some(vec![-95.40, 29.70, -95.30, 29.80]),
            features: vec![Feature {
                properties: Value::Null,
                geometry: crate::types::Geometry {
                    kind: "Polygon".to_string(),
                    coordinates: serde_json::json!([[
                        [-95.40, 29.70], [-95.30, 29.70], [-95.30, 29.80], [-95.40, 29.80]
                    ]]),
                },
            }],
        };
        let iso = isochrone_from_response(
            &fc,
            TransportMode::Walking,
            15.0,
            Coord::new(29.76, -95.37),
        )
        .unwrap();
        assert_eq!(iso.polygons.len(), 1);
        assert!((iso.bbox.min_lat - 29.70).abs() < 1e-9);
        assert!((iso.bbox.min_lng + 95.40).abs() < 1e-9);
        assert!((iso.polygons[0][0].lat - 29.70).abs() < 1e-9);
    }
}
