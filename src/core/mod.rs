pub mod options;
pub mod waypoint;

pub use options::{DurationUnit, EntityIcon, LineStyle, PlaybackOptions};
pub use waypoint::{LatLng, RawWaypoint, Waypoint};
