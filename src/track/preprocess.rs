use crate::core::{RawWaypoint, Waypoint};

/// Heading from `from` towards `to` in radians, `atan2(Δlng, Δlat)`
pub fn heading_between(from_lat: f64, from_lng: f64, to_lat: f64, to_lng: f64) -> f64 {
    (to_lng - from_lng).atan2(to_lat - from_lat)
}

/// Annotate a raw track.
///
/// Every waypoint but the last gets a heading towards its successor.
/// The last one is left without a heading since it has nothing to face.
pub fn annotate(raw: &[RawWaypoint]) -> Vec<Waypoint> {
    let mut waypoints: Vec<Waypoint> = raw.iter().map(Waypoint::from_raw).collect();
    fill_headings(&mut waypoints, 0);
    waypoints
}

/// Annotate `raw` and append it to an already annotated track.
///
/// The previous final waypoint gains a heading towards the first appended
/// point. Existing interpolation state is left untouched.
pub fn append(track: &mut Vec<Waypoint>, raw: &[RawWaypoint]) {
    if raw.is_empty() {
        return;
    }
    let from = track.len().saturating_sub(1);
    track.extend(raw.iter().map(Waypoint::from_raw));
    fill_headings(track, from);
}

fn fill_headings(waypoints: &mut [Waypoint], from: usize) {
    for i in from..waypoints.len().saturating_sub(1) {
        let next = &waypoints[i + 1];
        let (to_lat, to_lng) = (next.lat, next.lng);
        let wp = &mut waypoints[i];
        wp.heading = Some(heading_between(wp.lat, wp.lng, to_lat, to_lng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn raw(lng: f64, lat: f64, secs: i64) -> RawWaypoint {
        RawWaypoint::new(lng, lat, Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn test_headings() {
        let track = annotate(&[raw(0.0, 0.0, 0), raw(0.0, 1.0, 60), raw(1.0, 1.0, 120), raw(1.0, 0.0, 180)]);
        assert_eq!(track[0].heading, Some(0.0));
        assert_eq!(track[1].heading, Some(FRAC_PI_2));
        assert_eq!(track[2].heading, Some(PI));
        assert_eq!(track[3].heading, None);
        assert!(track.iter().all(|wp| wp.intermediate_index == 0 && wp.intermediate_points.is_empty()));
    }

    #[test]
    fn test_single_waypoint() {
        let track = annotate(&[raw(3.0, 4.0, 0)]);
        assert_eq!(track.len(), 1);
        assert!(track[0].heading.is_none());
    }

    #[test]
    fn test_append_links_previous_tail() {
        let mut track = annotate(&[raw(0.0, 0.0, 0), raw(0.0, 1.0, 60)]);
        track[0].intermediate_index = 7;
        append(&mut track, &[raw(1.0, 1.0, 120), raw(2.0, 1.0, 180)]);

        assert_eq!(track.len(), 4);
        assert_eq!(track[0].intermediate_index, 7);
        assert_eq!(track[1].heading, Some(FRAC_PI_2));
        assert_eq!(track[2].heading, Some(FRAC_PI_2));
        assert_eq!(track[3].heading, None);
    }

    #[test]
    fn test_append_to_empty() {
        let mut track = Vec::new();
        append(&mut track, &[raw(0.0, 0.0, 0), raw(0.0, 1.0, 60)]);
        assert_eq!(track.len(), 2);
        assert_eq!(track[0].heading, Some(0.0));
    }
}
