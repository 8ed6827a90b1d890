use serde::{Deserialize, Serialize};

/// Default number of interpolation subdivisions per segment
pub const DEFAULT_INTERMEDIATE_POINTS: usize = 500;

/// Time scale applied to the real time between two waypoints
///
/// Long gaps between recorded points would otherwise turn into
/// equally long pauses on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Real time is used as-is
    Second,
    /// Real time divided by 6
    #[default]
    Minute,
    /// Real time divided by 36
    Hour,
    /// Timestamps are ignored, every sub-step takes a fixed 100ms
    #[serde(rename = "none")]
    Unscaled,
}

impl DurationUnit {
    /// Scale a real-time delta into segment animation time.
    ///
    /// Returns `None` for [`DurationUnit::Unscaled`].
    pub fn scale(&self, real_ms: f64) -> Option<f64> {
        match self {
            DurationUnit::Second => Some(real_ms),
            DurationUnit::Minute => Some(real_ms / 6.0),
            DurationUnit::Hour => Some(real_ms / 36.0),
            DurationUnit::Unscaled => None,
        }
    }
}

impl std::str::FromStr for DurationUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "second" | "s" => Ok(DurationUnit::Second),
            "minute" | "m" => Ok(DurationUnit::Minute),
            "hour" | "h" => Ok(DurationUnit::Hour),
            "none" => Ok(DurationUnit::Unscaled),
            other => anyhow::bail!("Unknown duration unit: {}", other),
        }
    }
}

/// Styling for a drawn path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub line_color: String,
    /// Arrow decoration color. `None` draws no arrows.
    #[serde(default)]
    pub arrow_color: Option<String>,
}

impl LineStyle {
    pub fn new(line_color: &str, arrow_color: Option<&str>) -> Self {
        Self {
            line_color: line_color.to_string(),
            arrow_color: arrow_color.map(str::to_string),
        }
    }

    pub fn has_arrows(&self) -> bool {
        self.arrow_color.is_some()
    }

    fn default_track() -> Self {
        Self::new("#fff", Some("#000000"))
    }

    fn default_pass() -> Self {
        Self::new("#1afa29", Some("#FFFFFF"))
    }
}

/// Icon used for the moving entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityIcon {
    pub url: String,
    pub size: [u32; 2],
    pub anchor: [u32; 2],
}

impl Default for EntityIcon {
    fn default() -> Self {
        Self {
            url: "static/plane.png".to_string(),
            size: [30, 30],
            anchor: [16, 15],
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackOptions {
    /// Integer speed multiplier, divides every tick delay
    pub speed: u32,
    /// Return to the first waypoint when the track ends
    pub ended_to_start: bool,
    /// Restart from zero when the track ends
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Rotate the entity to the segment heading
    pub marker_rotate: bool,
    pub duration_unit: DurationUnit,
    /// Subdivisions per segment. Fixed once a player is constructed.
    pub intermediate_point_count: usize,
    /// Center the camera on every waypoint crossed
    pub view_follow: bool,
    /// Zoom passed with camera-follow requests, `None` keeps the current zoom
    pub follow_zoom: Option<f64>,
    pub marker_icon: Option<EntityIcon>,
    pub track_line: LineStyle,
    pub pass_line: LineStyle,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: 1,
            ended_to_start: false,
            loop_playback: false,
            marker_rotate: true,
            duration_unit: DurationUnit::default(),
            intermediate_point_count: DEFAULT_INTERMEDIATE_POINTS,
            view_follow: true,
            follow_zoom: None,
            marker_icon: None,
            track_line: LineStyle::default_track(),
            pass_line: LineStyle::default_pass(),
        }
    }
}

impl PlaybackOptions {
    /// Icon for the moving entity, falling back to the built-in one
    pub fn icon(&self) -> EntityIcon {
        self.marker_icon.clone().unwrap_or_default()
    }
}
