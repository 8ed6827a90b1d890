use anyhow::{Context, Result};
use crate::core::RawWaypoint;
use crate::input::parse_time;
use serde::Deserialize;

/// Timestamps may be given as text or as epoch milliseconds
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Millis(i64),
    Text(String),
}

#[derive(Deserialize)]
struct JsonWaypoint {
    lng: f64,
    lat: f64,
    time: TimeValue,
}

/// Parse a JSON array of `{lng, lat, time}` objects
pub fn parse_json(data: &[u8]) -> Result<Vec<RawWaypoint>> {
    let records: Vec<JsonWaypoint> = serde_json::from_slice(data).context("Failed to parse track JSON")?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let time = match r.time {
                TimeValue::Millis(ms) => parse_time(&ms.to_string()),
                TimeValue::Text(s) => parse_time(&s),
            }
            .with_context(|| format!("Bad time on waypoint {}", i))?;
            Ok(RawWaypoint { lng: r.lng, lat: r.lat, time })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_mixed_times() {
        let data = br#"[
            {"lng": 114.05, "lat": 22.54, "time": "2024-03-01 08:00:00"},
            {"lng": 114.06, "lat": 22.55, "time": 1709280060000}
        ]"#;
        let track = parse_json(data).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!((track[1].time - track[0].time).num_seconds(), 60);
    }

    #[test]
    fn test_parse_json_errors() {
        assert!(parse_json(b"{}").is_err());
        assert!(parse_json(br#"[{"lng": 1, "lat": 2, "time": "soon"}]"#).is_err());
    }
}
