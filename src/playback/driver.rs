//! Runs a [`TrackPlayer`] on the tokio runtime.
//!
//! The player is owned by a single task that waits on two things: the next
//! scheduler deadline and a command channel. Commands are applied between
//! ticks, never during one, so a listener may hold a [`PlayerHandle`] and
//! call back into the player safely.

use crate::core::{DurationUnit, RawWaypoint};
use crate::playback::events::{ArrivalListener, Channel, ProgressListener};
use crate::playback::{PlaybackError, PlaybackState, TrackPlayer};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Command sent to the player task
pub enum PlayerCommand {
    Start(Option<f64>),
    Pause,
    Reset,
    SetSpeed(u32),
    SetDurationUnit(DurationUnit),
    AddWaypoints(Vec<RawWaypoint>),
    SubscribeProgress(ProgressListener),
    UnsubscribeProgress(ProgressListener),
    SubscribeArrival(ArrivalListener),
    UnsubscribeArrival(ArrivalListener),
    Destroy,
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown,
}

/// Point-in-time view of a running player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub cursor: Option<(usize, usize)>,
    pub waypoint_count: usize,
    pub speed: u32,
    pub tick_pending: bool,
    pub progress_subscribers: usize,
    pub arrival_subscribers: usize,
}

impl PlayerSnapshot {
    fn of(player: &TrackPlayer) -> Self {
        Self {
            state: player.state().clone(),
            cursor: player.cursor(),
            waypoint_count: player.waypoints().len(),
            speed: player.options().speed,
            tick_pending: player.has_pending_tick(),
            progress_subscribers: player.subscriber_count(Channel::ProgressUpdate),
            arrival_subscribers: player.subscriber_count(Channel::WaypointArrival),
        }
    }
}

/// Cloneable handle to a player task
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    fn send(&self, command: PlayerCommand) -> Result<(), PlaybackError> {
        self.tx.send(command).map_err(|_| PlaybackError::DriverClosed)
    }

    pub fn start(&self, progress: Option<f64>) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::Start(progress))
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::Pause)
    }

    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::Reset)
    }

    pub fn set_speed(&self, speed: u32) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::SetSpeed(speed))
    }

    pub fn set_duration_unit(&self, unit: DurationUnit) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::SetDurationUnit(unit))
    }

    pub fn add_waypoints(&self, track: Vec<RawWaypoint>) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::AddWaypoints(track))
    }

    pub fn subscribe_progress(&self, listener: ProgressListener) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::SubscribeProgress(listener))
    }

    pub fn unsubscribe_progress(&self, listener: ProgressListener) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::UnsubscribeProgress(listener))
    }

    pub fn subscribe_arrival(&self, listener: ArrivalListener) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::SubscribeArrival(listener))
    }

    pub fn unsubscribe_arrival(&self, listener: ArrivalListener) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::UnsubscribeArrival(listener))
    }

    pub fn destroy(&self) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::Destroy)
    }

    /// Stop the task. Its join handle yields the player back.
    pub fn shutdown(&self) -> Result<(), PlaybackError> {
        self.send(PlayerCommand::Shutdown)
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot, PlaybackError> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(tx))?;
        rx.await.map_err(|_| PlaybackError::DriverClosed)
    }
}

/// Move `player` onto its own task
pub fn spawn_player(player: TrackPlayer) -> (PlayerHandle, JoinHandle<TrackPlayer>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(player, rx));
    (PlayerHandle { tx }, task)
}

async fn run(mut player: TrackPlayer, mut rx: mpsc::UnboundedReceiver<PlayerCommand>) -> TrackPlayer {
    loop {
        let deadline = player.next_deadline();
        tokio::select! {
            // Commands first, so a pause that raced a due tick still wins
            biased;

            command = rx.recv() => match command {
                Some(PlayerCommand::Shutdown) | None => break,
                Some(command) => apply(&mut player, command),
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                player.on_timer();
            }
        }
    }
    debug!("Player task stopped");
    player
}

fn apply(player: &mut TrackPlayer, command: PlayerCommand) {
    let result = match command {
        PlayerCommand::Start(progress) => player.start(progress),
        PlayerCommand::Pause => {
            player.pause();
            Ok(())
        }
        PlayerCommand::Reset => player.reset(),
        PlayerCommand::SetSpeed(speed) => {
            player.set_speed(speed);
            Ok(())
        }
        PlayerCommand::SetDurationUnit(unit) => {
            player.set_duration_unit(unit);
            Ok(())
        }
        PlayerCommand::AddWaypoints(track) => player.add_waypoints(&track).map(|_| ()),
        PlayerCommand::SubscribeProgress(listener) => {
            player.subscribe_progress(listener);
            Ok(())
        }
        PlayerCommand::UnsubscribeProgress(listener) => {
            player.unsubscribe_progress(&listener);
            Ok(())
        }
        PlayerCommand::SubscribeArrival(listener) => {
            player.subscribe_arrival(listener);
            Ok(())
        }
        PlayerCommand::UnsubscribeArrival(listener) => {
            player.unsubscribe_arrival(&listener);
            Ok(())
        }
        PlayerCommand::Destroy => {
            player.destroy();
            Ok(())
        }
        PlayerCommand::Snapshot(reply) => {
            let _ = reply.send(PlayerSnapshot::of(player));
            Ok(())
        }
        PlayerCommand::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        debug!("Player command rejected: {}", e);
    }
}
