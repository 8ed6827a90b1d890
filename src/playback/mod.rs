pub mod driver;
pub mod engine;
pub mod events;
pub mod scheduler;

pub use driver::{spawn_player, PlayerHandle};
pub use engine::TrackPlayer;
pub use events::{ArrivalListener, EventBus, ProgressListener, ProgressUpdate};
pub use scheduler::ProgressScheduler;

use serde::Serialize;

/// Overall lifecycle of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleStatus {
    /// Not initialized yet, or destroyed
    #[default]
    UnStarted,
    Progress,
    End,
}

/// Whether the entity is currently advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementStatus {
    #[default]
    Stop,
    Moving,
}

/// Playback state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub lifecycle: LifecycleStatus,
    pub movement: MovementStatus,
    /// Index of the waypoint whose segment the entity is on
    pub current: Option<usize>,
    /// Overall progress in `[0, 100]`
    pub overall_progress: f64,
    /// Progress covered by a single intermediate point
    pub progress_step: f64,
}

/// Error type for playback operations
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("{operation} called before the player was initialized")]
    NotInitialized { operation: &'static str },
    #[error("Track has no waypoints")]
    EmptyTrack,
    #[error("Player task is no longer running")]
    DriverClosed,
}
