use crate::core::{DurationUnit, LatLng, PlaybackOptions, RawWaypoint, Waypoint};
use crate::playback::events::{ArrivalListener, Channel, EventBus, ProgressListener, ProgressUpdate};
use crate::playback::scheduler::ProgressScheduler;
use crate::playback::{LifecycleStatus, MovementStatus, PlaybackError, PlaybackState};
use crate::render::{EntityHandle, OverlayHandle, RendererAdapter};
use crate::track::{interpolate, preprocess};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tolerance when deciding whether a seek lands on a step boundary
const STEP_EPSILON: f64 = 1e-6;

/// Renderer plus the objects the player created on it
struct Scene {
    renderer: Box<dyn RendererAdapter>,
    full_path: OverlayHandle,
    traveled_path: OverlayHandle,
    entity: EntityHandle,
}

/// Replays a waypoint track on a renderer
///
/// Every operation runs to completion synchronously; the only suspension
/// point is the wait between scheduler ticks, which belongs to whoever owns
/// the player (see [`crate::playback::spawn_player`]). Events produced while
/// an operation or tick runs are delivered when it returns.
pub struct TrackPlayer {
    options: PlaybackOptions,
    intermediate_count: usize,
    waypoints: Vec<Waypoint>,
    state: PlaybackState,
    scheduler: ProgressScheduler,
    events: EventBus,
    scene: Option<Scene>,
}

impl TrackPlayer {
    pub fn new(mut options: PlaybackOptions) -> Self {
        if options.speed == 0 {
            warn!("Speed multiplier of 0 is not allowed, using 1");
            options.speed = 1;
        }
        let intermediate_count = options.intermediate_point_count.max(1);
        Self {
            options,
            intermediate_count,
            waypoints: Vec::new(),
            state: PlaybackState::default(),
            scheduler: ProgressScheduler::new(),
            events: EventBus::new(),
            scene: None,
        }
    }

    /// Load the track and draw it. Returns the progress step, the smallest
    /// increment `start` can seek by without landing between two points.
    ///
    /// Calling this on an initialized player does nothing.
    pub fn initialize(
        &mut self,
        mut renderer: Box<dyn RendererAdapter>,
        track: &[RawWaypoint],
    ) -> Result<f64, PlaybackError> {
        if self.scene.is_some() {
            debug!("Track player already initialized");
            return Ok(self.state.progress_step);
        }
        if track.is_empty() {
            return Err(PlaybackError::EmptyTrack);
        }

        self.waypoints = preprocess::annotate(track);
        let positions = self.positions();

        let full_path = renderer.create_full_path_overlay(&positions, &self.options.track_line);
        let traveled_path = renderer.create_traveled_path_overlay(positions.first().copied(), &self.options.pass_line);

        let first = &self.waypoints[0];
        let rotation = match (self.options.marker_rotate, first.heading) {
            (true, Some(heading)) => heading.to_degrees(),
            _ => 0.0,
        };
        let entity = renderer.create_moving_entity(&self.options.icon(), Some(first.position()), rotation);

        self.scene = Some(Scene {
            renderer,
            full_path,
            traveled_path,
            entity,
        });

        self.state = PlaybackState {
            lifecycle: LifecycleStatus::Progress,
            movement: MovementStatus::Stop,
            current: None,
            overall_progress: 0.0,
            progress_step: self.compute_progress_step(),
        };

        info!(
            waypoints = self.waypoints.len(),
            progress_step = self.state.progress_step,
            "Track player initialized"
        );
        Ok(self.state.progress_step)
    }

    /// Append waypoints to the live track without disturbing playback.
    /// Returns the new progress step.
    pub fn add_waypoints(&mut self, track: &[RawWaypoint]) -> Result<f64, PlaybackError> {
        self.require_initialized("add_waypoints")?;

        preprocess::append(&mut self.waypoints, track);
        let positions = self.positions();
        if let Some(scene) = self.scene.as_mut() {
            scene.renderer.update_full_path_overlay(scene.full_path, &positions);
        }
        self.state.progress_step = self.compute_progress_step();

        debug!(
            added = track.len(),
            waypoints = self.waypoints.len(),
            progress_step = self.state.progress_step,
            "Waypoints appended"
        );
        Ok(self.state.progress_step)
    }

    /// Start or resume playback.
    ///
    /// `None` resumes from the current position, `Some(0.0)` starts over and
    /// any other value seeks to that progress first. The entity is moved to
    /// the target immediately.
    pub fn start(&mut self, progress: Option<f64>) -> Result<(), PlaybackError> {
        self.require_initialized("start")?;
        self.begin(progress);
        self.events.flush();
        Ok(())
    }

    /// Stop moving, keeping the current position
    pub fn pause(&mut self) {
        self.scheduler.cancel();
        if self.scene.is_none() {
            return;
        }
        self.state.movement = MovementStatus::Stop;
        self.state.lifecycle = LifecycleStatus::Progress;
    }

    /// Return to the first waypoint, stopped
    pub fn reset(&mut self) -> Result<(), PlaybackError> {
        self.scheduler.cancel();
        self.require_initialized("reset")?;

        self.rewind();
        self.state.lifecycle = LifecycleStatus::Progress;
        self.state.movement = MovementStatus::Stop;
        self.step();
        self.events.flush();
        Ok(())
    }

    /// Tear everything down: track data, renderer objects and listeners.
    /// The player can be initialized again afterwards.
    pub fn destroy(&mut self) {
        let Some(mut scene) = self.scene.take() else {
            return;
        };
        self.scheduler.cancel();

        scene.renderer.remove_entity(scene.entity);
        scene.renderer.remove_overlay(scene.traveled_path);
        scene.renderer.remove_overlay(scene.full_path);

        self.waypoints.clear();
        self.events.clear();
        self.state = PlaybackState::default();
        self.options.speed = 1;
        info!("Track player destroyed");
    }

    /// Set the speed multiplier. Zero is ignored.
    pub fn set_speed(&mut self, speed: u32) {
        if speed == 0 {
            warn!("Ignoring speed multiplier of 0");
            return;
        }
        self.options.speed = speed;
    }

    /// Change the duration unit; applies from the next step
    pub fn set_duration_unit(&mut self, unit: DurationUnit) {
        self.options.duration_unit = unit;
    }

    pub fn subscribe_progress(&mut self, listener: ProgressListener) -> bool {
        self.events.subscribe_progress(listener)
    }

    pub fn unsubscribe_progress(&mut self, listener: &ProgressListener) -> bool {
        self.events.unsubscribe_progress(listener)
    }

    pub fn subscribe_arrival(&mut self, listener: ArrivalListener) -> bool {
        self.events.subscribe_arrival(listener)
    }

    pub fn unsubscribe_arrival(&mut self, listener: &ArrivalListener) -> bool {
        self.events.unsubscribe_arrival(listener)
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.events.subscriber_count(channel)
    }

    /// Run one scheduler tick: advance if moving, then schedule the next one
    pub fn on_timer(&mut self) {
        self.scheduler.cancel();
        if self.state.movement == MovementStatus::Moving {
            self.step();
        }
        self.schedule_next();
        self.events.flush();
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    /// Current (waypoint index, intermediate index)
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.state
            .current
            .map(|i| (i, self.waypoints[i].intermediate_index))
    }

    /// When the next tick is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Delay the pending tick was scheduled with
    pub fn pending_delay(&self) -> Option<Duration> {
        self.scheduler.pending_delay()
    }

    pub fn has_pending_tick(&self) -> bool {
        self.scheduler.is_pending()
    }

    fn require_initialized(&self, operation: &'static str) -> Result<(), PlaybackError> {
        if self.scene.is_none() {
            warn!(operation, "Track player is not initialized");
            return Err(PlaybackError::NotInitialized { operation });
        }
        Ok(())
    }

    fn begin(&mut self, progress: Option<f64>) {
        self.scheduler.cancel();
        self.state.movement = MovementStatus::Moving;
        self.state.lifecycle = LifecycleStatus::Progress;

        match progress {
            Some(p) if p != 0.0 => self.seek(p),
            Some(_) => self.state.current = None,
            None => {}
        }

        self.step();
        self.schedule_next();
    }

    /// Place the cursor one sub-step before `progress`, so the following
    /// step lands exactly on it.
    fn seek(&mut self, progress: f64) {
        let n = self.waypoints.len();
        if n < 2 {
            return;
        }
        let count = self.intermediate_count;
        let steps_total = (n - 1) * count;
        let progress = progress.clamp(0.0, 100.0);

        let raw = progress / (100.0 / steps_total as f64);
        let rounded = raw.round();
        let step_index = if (raw - rounded).abs() <= STEP_EPSILON {
            rounded
        } else {
            warn!(
                progress,
                step_index = raw,
                progress_step = self.state.progress_step,
                "Seek target is not a multiple of the progress step, truncating"
            );
            raw.floor()
        };
        let step_index = (step_index as usize).min(steps_total);
        let (index, sub) = (step_index / count, step_index % count);
        debug!(progress, index, sub, "Seeking");

        if sub > 0 {
            self.ensure_segment(index);
            self.waypoints[index].intermediate_index = sub - 1;
            self.state.current = Some(index);
        } else if index == 0 {
            self.state.current = None;
        } else {
            let prev = index - 1;
            self.ensure_segment(prev);
            let wp = &mut self.waypoints[prev];
            wp.intermediate_index = wp.intermediate_points.len() - 1;
            self.state.current = Some(prev);
        }
    }

    /// Advance the entity by one intermediate point
    fn step(&mut self) {
        let n = self.waypoints.len();
        if n < 2 {
            // Nothing to animate, a moving one-point track ends at once
            if self.state.movement == MovementStatus::Moving {
                self.finish();
            }
            return;
        }

        let index = match self.state.current {
            None => {
                self.waypoints[0].intermediate_index = 0;
                0
            }
            Some(i) if !self.waypoints[i].segment_finished() => {
                self.waypoints[i].intermediate_index += 1;
                i
            }
            Some(i) => {
                // Entering a segment always restarts it, whatever a seek left behind
                let next = i + 1;
                if let Some(wp) = self.waypoints.get_mut(next) {
                    wp.intermediate_index = 0;
                }
                next
            }
        };

        if index >= n - 1 {
            self.finish();
            return;
        }

        self.ensure_segment(index);
        self.refresh_segment_duration(index);

        let wp = &self.waypoints[index];
        let sub = wp.intermediate_index;
        let point = wp.intermediate_points[sub];

        if let Some(scene) = self.scene.as_mut() {
            scene.renderer.update_entity_position(scene.entity, point.lat, point.lng);
            if self.options.marker_rotate {
                if let Some(heading) = wp.heading {
                    // Full bearing in degrees, not halved
                    scene.renderer.update_entity_rotation(scene.entity, heading.to_degrees());
                }
            }
            let traveled = traveled_path(&self.waypoints, index);
            scene.renderer.update_traveled_path_overlay(scene.traveled_path, &traveled);

            if sub == 0 && self.options.view_follow {
                scene.renderer.follow_camera(point.lat, point.lng, self.options.follow_zoom);
            }
        }

        if sub == 0 {
            self.events.publish_arrival(wp.clone());
        }

        self.state.current = Some(index);
        self.state.overall_progress = self.progress_at(index, sub);
        self.publish_progress();
    }

    /// End-of-track handling, then the return-to-start and loop policies
    fn finish(&mut self) {
        self.scheduler.cancel();
        self.state.lifecycle = LifecycleStatus::End;
        self.state.movement = MovementStatus::Stop;
        self.rewind();
        self.state.overall_progress = 100.0;
        self.publish_progress();
        info!("Track finished");

        if self.waypoints.len() < 2 {
            return;
        }

        if self.options.ended_to_start {
            self.state.lifecycle = LifecycleStatus::Progress;
            self.state.movement = MovementStatus::Stop;
            self.step();
        }

        if self.options.loop_playback {
            debug!("Looping track");
            self.begin(Some(0.0));
        }
    }

    fn schedule_next(&mut self) {
        if self.state.lifecycle != LifecycleStatus::Progress
            || self.state.movement != MovementStatus::Moving
            || self.waypoints.len() < 2
        {
            return;
        }

        let segment_ms = match (self.options.duration_unit, self.state.current) {
            (DurationUnit::Unscaled, _) | (_, None) => None,
            (_, Some(i)) => Some(self.waypoints[i].segment_duration_ms),
        };
        let delay = ProgressScheduler::tick_delay(segment_ms, self.intermediate_count, self.options.speed);
        self.scheduler.schedule(delay);
    }

    fn rewind(&mut self) {
        self.state.current = None;
        for wp in &mut self.waypoints {
            wp.intermediate_index = 0;
        }
    }

    /// Interpolate the segment starting at `index` if it has not been yet
    fn ensure_segment(&mut self, index: usize) {
        let Some(end) = self.waypoints.get(index + 1).map(Waypoint::position) else {
            return;
        };
        let wp = &mut self.waypoints[index];
        if wp.intermediate_points.is_empty() {
            wp.intermediate_points = interpolate(wp.position(), end, self.intermediate_count);
        }
    }

    fn refresh_segment_duration(&mut self, index: usize) {
        let Some(next) = self.waypoints.get(index + 1) else {
            return;
        };
        let real_ms = self.waypoints[index].millis_until(next);
        if let Some(ms) = self.options.duration_unit.scale(real_ms) {
            self.waypoints[index].segment_duration_ms = ms;
        }
    }

    fn progress_at(&self, index: usize, sub: usize) -> f64 {
        let segments = (self.waypoints.len() - 1) as f64;
        let per_segment = 100.0 / segments;
        per_segment * index as f64 + per_segment / self.intermediate_count as f64 * sub as f64
    }

    fn compute_progress_step(&self) -> f64 {
        let n = self.waypoints.len();
        if n < 2 {
            return 0.0;
        }
        100.0 / ((n - 1) as f64 * self.intermediate_count as f64)
    }

    fn positions(&self) -> Vec<LatLng> {
        self.waypoints.iter().map(Waypoint::position).collect()
    }

    fn publish_progress(&mut self) {
        let update = ProgressUpdate {
            speed: self.options.speed,
            overall_progress: self.state.overall_progress,
            progress_step: self.state.progress_step,
            movement: self.state.movement,
            lifecycle: self.state.lifecycle,
            entity: self.scene.as_ref().map(|s| s.entity),
            traveled_path: self.scene.as_ref().map(|s| s.traveled_path),
        };
        self.events.publish_progress(update);
    }
}

/// Every waypoint up to `index`, followed by the covered part of its segment
fn traveled_path(waypoints: &[Waypoint], index: usize) -> Vec<LatLng> {
    let current = &waypoints[index];
    let mut points: Vec<LatLng> = waypoints[..=index].iter().map(Waypoint::position).collect();
    let covered = (current.intermediate_index + 1).min(current.intermediate_points.len());
    points.extend_from_slice(&current.intermediate_points[..covered]);
    points
}
