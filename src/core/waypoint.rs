use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A raw, time-stamped input point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWaypoint {
    /// Longitude in degrees
    pub lng: f64,

    /// Latitude in degrees
    pub lat: f64,

    /// Recorded time in UTC
    pub time: DateTime<Utc>,
}

impl RawWaypoint {
    pub fn new(lng: f64, lat: f64, time: DateTime<Utc>) -> Self {
        Self { lng, lat, time }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A waypoint annotated with the state needed to animate the segment
/// that starts at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub lng: f64,
    pub lat: f64,
    pub time: DateTime<Utc>,

    /// Bearing towards the next waypoint in radians, `atan2(Δlng, Δlat)`.
    /// `None` on the final waypoint of a track.
    pub heading: Option<f64>,

    /// Cursor into `intermediate_points`
    pub intermediate_index: usize,

    /// Interpolated positions from this waypoint to its successor.
    /// Empty until the segment is first visited.
    pub intermediate_points: Vec<LatLng>,

    /// Animation time for the whole segment, recomputed on every step
    pub segment_duration_ms: f64,
}

impl Waypoint {
    pub fn from_raw(raw: &RawWaypoint) -> Self {
        Self {
            lng: raw.lng,
            lat: raw.lat,
            time: raw.time,
            heading: None,
            intermediate_index: 0,
            intermediate_points: Vec::new(),
            segment_duration_ms: 0.0,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Whether the cursor sits on the last interpolated point of the segment
    pub fn segment_finished(&self) -> bool {
        self.intermediate_index + 1 >= self.intermediate_points.len()
    }

    /// Milliseconds of real time between this waypoint and `next`
    pub fn millis_until(&self, next: &Waypoint) -> f64 {
        (next.time - self.time).num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_raw_starts_unvisited() {
        let raw = RawWaypoint::new(114.1, 22.5, Utc.timestamp_millis_opt(0).unwrap());
        let wp = Waypoint::from_raw(&raw);
        assert_eq!(wp.intermediate_index, 0);
        assert!(wp.intermediate_points.is_empty());
        assert!(wp.heading.is_none());
        assert!(wp.segment_finished());
    }

    #[test]
    fn test_millis_until() {
        let a = Waypoint::from_raw(&RawWaypoint::new(0.0, 0.0, Utc.timestamp_millis_opt(1_000).unwrap()));
        let b = Waypoint::from_raw(&RawWaypoint::new(0.0, 0.0, Utc.timestamp_millis_opt(61_000).unwrap()));
        assert_eq!(a.millis_until(&b), 60_000.0);
    }
}
