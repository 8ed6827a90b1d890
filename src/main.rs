use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use track_player::config;
use track_player::core::{DurationUnit, Waypoint};
use track_player::input;
use track_player::playback::{spawn_player, LifecycleStatus, ProgressUpdate, TrackPlayer};
use track_player::render::TraceRenderer;

const USAGE: &str = "Usage: track-player <track-file> [--options FILE] [--speed N] [--unit second|minute|hour|none] [--loop] [--ended-to-start]";

/// Command line arguments
#[derive(Debug, Default)]
struct Args {
    track: PathBuf,
    options: Option<PathBuf>,
    speed: Option<u32>,
    unit: Option<DurationUnit>,
    loop_playback: bool,
    ended_to_start: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut track = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--options" => parsed.options = Some(PathBuf::from(args.next().context("--options needs a path")?)),
                "--speed" => {
                    let value = args.next().context("--speed needs a value")?;
                    parsed.speed = Some(value.parse().with_context(|| format!("Invalid speed: {}", value))?);
                }
                "--unit" => parsed.unit = Some(args.next().context("--unit needs a value")?.parse()?),
                "--loop" => parsed.loop_playback = true,
                "--ended-to-start" => parsed.ended_to_start = true,
                "-h" | "--help" => anyhow::bail!(USAGE),
                other if other.starts_with("--") => anyhow::bail!("Unknown flag: {}\n{}", other, USAGE),
                other => track = Some(PathBuf::from(other)),
            }
        }

        parsed.track = track.context(USAGE)?;
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let mut options = config::load_options(args.options.as_deref())?;
    if let Some(speed) = args.speed {
        options.speed = speed;
    }
    if let Some(unit) = args.unit {
        options.duration_unit = unit;
    }
    options.loop_playback |= args.loop_playback;
    options.ended_to_start |= args.ended_to_start;
    let track = input::load_track(&args.track)?;
    info!("Loaded {} waypoints from {:?}", track.len(), args.track);
    // A one-point track ends without looping
    let looping = options.loop_playback && track.len() > 1;

    let mut player = TrackPlayer::new(options);
    player.initialize(Box::new(TraceRenderer::new()), &track)?;

    let (ended_tx, mut ended_rx) = mpsc::unbounded_channel();
    player.subscribe_progress(Arc::new(move |update: &ProgressUpdate| {
        debug!(progress = update.overall_progress, speed = update.speed, "Progress");
        if update.lifecycle == LifecycleStatus::End {
            let _ = ended_tx.send(());
        }
    }));
    player.subscribe_arrival(Arc::new(|wp: &Waypoint| {
        info!(lng = wp.lng, lat = wp.lat, time = %wp.time, "Arrived at waypoint");
    }));

    let (handle, task) = spawn_player(player);
    handle.start(None)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            Some(()) = ended_rx.recv() => {
                if !looping {
                    break;
                }
            }
        }
    }

    let snapshot = handle.snapshot().await?;
    handle.destroy()?;
    handle.shutdown()?;
    task.await?;
    info!(progress = snapshot.state.overall_progress, "Playback stopped");
    Ok(())
}
