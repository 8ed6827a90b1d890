use anyhow::{Context, Result};
use crate::core::PlaybackOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default location of the persisted playback options
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("track-player").join("options.json"))
}

/// Load playback options.
///
/// An explicit path must exist and parse. Without one, the per-user config
/// file is tried, and defaults are used if it is missing or unreadable.
pub fn load_options(path: Option<&Path>) -> Result<PlaybackOptions> {
    if let Some(path) = path {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read options file: {:?}", path))?;
        return parse_options(&contents).with_context(|| format!("Invalid options file: {:?}", path));
    }

    if let Some(path) = config_path() {
        if path.exists() {
            match fs::read_to_string(&path).map_err(anyhow::Error::from).and_then(|c| parse_options(&c)) {
                Ok(options) => {
                    debug!("Loaded options from {:?}", path);
                    return Ok(options);
                }
                Err(e) => warn!("Ignoring unreadable options file {:?}: {:#}", path, e),
            }
        }
    }

    Ok(PlaybackOptions::default())
}

/// Parse options JSON. Missing fields take their defaults.
pub fn parse_options(contents: &str) -> Result<PlaybackOptions> {
    let options: PlaybackOptions = serde_json::from_str(contents)?;
    Ok(options)
}

/// Write options as pretty JSON, creating parent directories
pub fn save_options(options: &PlaybackOptions, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(options)?;
    fs::write(path, json).with_context(|| format!("Failed to write options file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DurationUnit;

    #[test]
    fn test_partial_options_use_defaults() {
        let options = parse_options(r#"{"speed": 3, "loop": true, "durationUnit": "none"}"#).unwrap();
        assert_eq!(options.speed, 3);
        assert!(options.loop_playback);
        assert_eq!(options.duration_unit, DurationUnit::Unscaled);
        assert!(options.marker_rotate);
        assert_eq!(options.intermediate_point_count, 500);
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(parse_options(r#"{"speed": "fast"}"#).is_err());
        assert!(parse_options(r#"{"durationUnit": "day"}"#).is_err());
    }

    #[test]
    fn test_save_then_load_explicit_path() {
        let dir = std::env::temp_dir().join(format!("track-player-test-{}", std::process::id()));
        let path = dir.join("nested").join("options.json");

        let options = PlaybackOptions {
            speed: 8,
            ended_to_start: true,
            follow_zoom: Some(14.0),
            ..Default::default()
        };
        save_options(&options, &path).unwrap();
        let loaded = load_options(Some(path.as_path())).unwrap();
        assert_eq!(loaded, options);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let path = std::env::temp_dir().join("track-player-does-not-exist.json");
        assert!(load_options(Some(path.as_path())).is_err());
    }
}
