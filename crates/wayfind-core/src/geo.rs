//! Geospatial primitives.
//!
//! Great-circle distance, fallback travel-time estimation, ray-cast polygon
//! membership, and the bounding-box math used to pre-filter POI searches.
//! All functions are pure; coordinates are WGS84 degrees.

use serde::{Deserialize, Serialize};

use crate::location::{Location, TransportMode};
use crate::poi::Isochrone;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters spanned by one degree of latitude. Longitude shrinks with
/// `cos(lat)`; see [`BoundingBox::expand_meters`].
const METERS_PER_LAT_DEGREE: f64 = 111_320.0;

/// A bare `(lat, lng)` pair used for geometry that carries no display name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<&Location> for Coord {
    fn from(loc: &Location) -> Self {
        Self {
            lat: loc.lat,
            lng: loc.lng,
        }
    }
}

/// Great-circle (haversine) distance between two points in meters.
#[must_use]
pub fn haversine_distance_m(a: Coord, b: Coord) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Straight-line travel-time estimate in minutes for a distance and mode.
///
/// Used only when a routing-service duration is unavailable; real road
/// networks are slower than the crow flies, so callers treat this as an
/// optimistic lower bound.
#[must_use]
pub fn estimate_travel_time_min(distance_m: f64, mode: TransportMode) -> f64 {
    distance_m / mode.speed_m_s() / 60.0
}

/// Axis-aligned lat/lng bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing all `points`. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Coord]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min_lat: first.lat,
            min_lng: first.lng,
            max_lat: first.lat,
            max_lng: first.lng,
        };
        for p in &points[1..] {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.min_lng = bbox.min_lng.min(p.lng);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.max_lng = bbox.max_lng.max(p.lng);
        }
        Some(bbox)
    }

    #[must_use]
    pub fn contains(&self, point: Coord) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    #[must_use]
    pub fn center(&self) -> Coord {
        Coord {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lng: (self.min_lng + self.max_lng) / 2.0,
        }
    }

    /// Grows the box by `buffer_m` meters on every side.
    ///
    /// The longitude step is widened by `1/cos(lat)` at the box center so the
    /// physical buffer stays roughly uniform away from the equator.
    #[must_use]
    pub fn expand_meters(&self, buffer_m: f64) -> Self {
        let d_lat = buffer_m / METERS_PER_LAT_DEGREE;
        let center_lat = self.center().lat.to_radians();
        // cos(lat) approaches 0 at the poles; clamp to keep the box finite.
        let d_lng = buffer_m / (METERS_PER_LAT_DEGREE * center_lat.cos().abs().max(0.01));
        Self {
            min_lat: (self.min_lat - d_lat).max(-90.0),
            min_lng: (self.min_lng - d_lng).max(-180.0),
            max_lat: (self.max_lat + d_lat).min(90.0),
            max_lng: (self.max_lng + d_lng).min(180.0),
        }
    }
}

/// Ray-casting point-in-polygon test against a single ring.
///
/// The ring may be open or closed (first point repeated at the end); both
/// forms are handled. Points exactly on an edge may land on either side —
/// acceptable for geofencing against isochrone boundaries.
#[must_use]
pub fn point_in_polygon(point: Coord, ring: &[Coord]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        let crosses = (pi.lat > point.lat) != (pj.lat > point.lat)
            && point.lng
                < (pj.lng - pi.lng) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lng;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// True if `point` falls inside any polygon of the isochrone set.
///
/// Isochrones for multiple ranges or centers may be unioned into one set, so
/// membership in any polygon means "reachable".
#[must_use]
pub fn point_in_isochrone(point: Coord, isochrone: &Isochrone) -> bool {
    isochrone
        .polygons
        .iter()
        .any(|ring| point_in_polygon(point, ring))
}

/// Perpendicular distance in meters from `point` to the segment `a`–`b`.
///
/// Uses an equirectangular projection centered on the point; accurate to well
/// under a percent at the few-kilometer scales of a route corridor.
#[must_use]
pub fn point_to_segment_distance_m(point: Coord, a: Coord, b: Coord) -> f64 {
    let lat0 = point.lat.to_radians();
    let to_xy = |c: Coord| -> (f64, f64) {
        (
            (c.lng - point.lng).to_radians() * lat0.cos() * EARTH_RADIUS_M,
            (c.lat - point.lat).to_radians() * EARTH_RADIUS_M,
        )
    };
    let (ax, ay) = to_xy(a);
    let (bx, by) = to_xy(b);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((-ax * dx - ay * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (cx * cx + cy * cy).sqrt()
}

/// Minimum distance in meters from `point` to a polyline.
///
/// Returns `f64::INFINITY` for a polyline with fewer than two points.
#[must_use]
pub fn distance_to_polyline_m(point: Coord, polyline: &[Coord]) -> f64 {
    polyline
        .windows(2)
        .map(|w| point_to_segment_distance_m(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}
