use crate::core::LatLng;

/// Evenly spaced points on the straight line from `start` to `end`.
///
/// Returns `count + 1` points; the first is exactly `start` and the last
/// exactly `end`. Latitude and longitude are interpolated independently
/// and linearly, there is no easing. A `count` of zero is treated as one.
pub fn interpolate(start: LatLng, end: LatLng, count: usize) -> Vec<LatLng> {
    let count = count.max(1);
    let d_lat = end.lat - start.lat;
    let d_lng = end.lng - start.lng;

    let mut points: Vec<LatLng> = (0..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            LatLng::new(start.lat + d_lat * t, start.lng + d_lng * t)
        })
        .collect();

    // Pin the endpoints so accumulated rounding never shifts them
    points[0] = start;
    points[count] = end;
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count_and_endpoints() {
        let start = LatLng::new(22.543096, 114.057865);
        let end = LatLng::new(22.558887, 113.880771);
        for count in [1, 3, 10, 500, 997] {
            let pts = interpolate(start, end, count);
            assert_eq!(pts.len(), count + 1);
            assert_eq!(pts[0], start);
            assert_eq!(pts[count], end);
        }
    }

    #[test]
    fn test_linear_spacing() {
        let pts = interpolate(LatLng::new(0.0, 0.0), LatLng::new(10.0, -20.0), 4);
        assert_eq!(pts[1], LatLng::new(2.5, -5.0));
        assert_eq!(pts[2], LatLng::new(5.0, -10.0));
        assert_eq!(pts[3], LatLng::new(7.5, -15.0));
    }

    #[test]
    fn test_zero_length_segment() {
        let p = LatLng::new(1.0, 1.0);
        let pts = interpolate(p, p, 5);
        assert!(pts.iter().all(|q| *q == p));
    }

    #[test]
    fn test_zero_count_treated_as_one() {
        let pts = interpolate(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0), 0);
        assert_eq!(pts.len(), 2);
    }
}
