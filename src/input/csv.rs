use anyhow::{Context, Result};
use crate::core::RawWaypoint;
use crate::input::parse_time;
use std::io::Read;

/// Parse CSV track data from any reader
///
/// Columns are found by header name, in any order:
/// - longitude: lng, lon, longitude, x
/// - latitude: lat, latitude, y
/// - time: time, timestamp, t, ts
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawWaypoint>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?;
    let (lng_idx, lat_idx, time_idx) = detect_columns(headers)?;

    let mut track = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV row")?;
        let line = row + 2;

        let lng = parse_coord(&record, lng_idx).with_context(|| format!("Bad longitude on line {}", line))?;
        let lat = parse_coord(&record, lat_idx).with_context(|| format!("Bad latitude on line {}", line))?;
        let time = record
            .get(time_idx)
            .context("Missing time column")
            .and_then(parse_time)
            .with_context(|| format!("Bad time on line {}", line))?;

        track.push(RawWaypoint { lng, lat, time });
    }

    Ok(track)
}

fn parse_coord(record: &csv::StringRecord, idx: usize) -> Result<f64> {
    let field = record.get(idx).context("Missing column")?;
    Ok(field.parse::<f64>()?)
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<(usize, usize, usize)> {
    let lng_idx = find_column(headers, &["lng", "lon", "longitude", "x"])?;
    let lat_idx = find_column(headers, &["lat", "latitude", "y"])?;
    let time_idx = find_column(headers, &["time", "timestamp", "t", "ts"])?;

    Ok((lng_idx, lat_idx, time_idx))
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_csv_any_column_order() {
        let data = "Time, Latitude, Longitude\n\
                    2024-03-01T08:00:00Z, 22.54, 114.05\n\
                    2024-03-01T08:01:00Z, 22.55, 114.06\n";
        let track = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track[0].lat, 22.54);
        assert_eq!(track[0].lng, 114.05);
        assert_eq!(track[1].time, Utc.with_ymd_and_hms(2024, 3, 1, 8, 1, 0).unwrap());
    }

    #[test]
    fn test_parse_csv_epoch_millis() {
        let data = "lng,lat,ts\n114.0,22.0,1700000000000\n";
        let track = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(track[0].time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_column() {
        let data = "lng,lat\n114.0,22.0\n";
        assert!(parse_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_bad_row_reports_line() {
        let data = "lng,lat,time\n114.0,north,1700000000000\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
