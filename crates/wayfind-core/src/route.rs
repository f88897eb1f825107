use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, Coord};

/// One turn instruction within a route leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_m: f64,
    pub duration_min: f64,
}

/// A single routed leg between two points.
///
/// A multi-stop journey is an ordered sequence of legs, never a merged
/// object — callers sum distances/durations themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_m: f64,
    pub duration_min: f64,
    pub geometry: Vec<Coord>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_loss_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_speed_kmh: Option<f64>,
}

impl RouteInfo {
    /// Bounding box of the route geometry, if any.
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.geometry)
    }

    /// Geometric midpoint of the route line (by vertex index, not arc
    /// length); good enough as a corridor search center.
    #[must_use]
    pub fn midpoint(&self) -> Option<Coord> {
        if self.geometry.is_empty() {
            return None;
        }
        Some(self.geometry[self.geometry.len() / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(points: Vec<Coord>) -> RouteInfo {
        RouteInfo {
            distance_m: 1000.0,
            duration_min: 10.0,
            geometry: points,
            steps: vec![],
            warnings: vec![],
            elevation_gain_m: None,
            elevation_loss_m: None,
            avg_speed_kmh: None,
        }
    }

    #[test]
    fn midpoint_of_empty_geometry_is_none() {
        assert!(leg(vec![]).midpoint().is_none());
        assert!(leg(vec![]).bbox().is_none());
    }

    #[test]
    fn midpoint_picks_middle_vertex() {
        let route = leg(vec![
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 1.0),
            Coord::new(2.0, 2.0),
        ]);
        let mid = route.midpoint().unwrap();
        assert_eq!(mid, Coord::new(1.0, 1.0));
    }
}
