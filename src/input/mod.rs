pub mod csv;
pub mod json;

pub use self::csv::parse_csv;
pub use self::json::parse_json;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use crate::core::RawWaypoint;
use std::path::Path;
use tracing::warn;

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

/// Detect the format of a track file from its extension, then its content
pub fn detect_format(path: &Path, data: &[u8]) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
        Some("json") | Some("geojson") => return InputFormat::Json,
        Some("csv") => return InputFormat::Csv,
        _ => {}
    }

    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'[') {
        InputFormat::Json
    } else {
        InputFormat::Csv
    }
}

/// Load a track from a file, auto-detecting format
pub fn load_track<P: AsRef<Path>>(path: P) -> Result<Vec<RawWaypoint>> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("Failed to read track file: {:?}", path))?;

    let track = match detect_format(path, &data) {
        InputFormat::Json => parse_json(&data)?,
        InputFormat::Csv => parse_csv(data.as_slice())?,
    };
    Ok(sort_by_time(track))
}

/// Parse a timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC), or
/// integer milliseconds since the Unix epoch
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&t));
    }
    if let Ok(ms) = value.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(ms)
            .single()
            .with_context(|| format!("Timestamp out of range: {}", ms));
    }

    anyhow::bail!("Unrecognized timestamp: {}", value)
}

/// Order waypoints by time. Ties keep their input order.
pub fn sort_by_time(mut track: Vec<RawWaypoint>) -> Vec<RawWaypoint> {
    if track.windows(2).any(|w| w[0].time > w[1].time) {
        warn!(waypoints = track.len(), "Track is not ordered by time, sorting");
        track.sort_by_key(|wp| wp.time);
    }
    track
}
