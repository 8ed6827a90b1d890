use tokio::time::{Duration, Instant};
use tracing::warn;

/// Tick length used when timestamps are ignored
pub const FALLBACK_TICK: Duration = Duration::from_millis(100);

/// Below this a tick is too short for the motion to be perceived
pub const MIN_VISIBLE_TICK: Duration = Duration::from_millis(20);

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct PendingTick {
    id: TimerId,
    delay: Duration,
    deadline: Instant,
}

/// Single-slot tick timer
///
/// At most one tick is ever outstanding: scheduling a new one replaces
/// whatever was pending. The scheduler only keeps the deadline; whoever
/// owns the player waits for it and calls `TrackPlayer::on_timer`.
#[derive(Debug, Default)]
pub struct ProgressScheduler {
    pending: Option<PendingTick>,
    issued: u64,
}

impl ProgressScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending tick with one due after `delay`
    pub fn schedule(&mut self, delay: Duration) -> TimerId {
        self.cancel();
        self.issued += 1;
        let id = TimerId(self.issued);
        self.pending = Some(PendingTick {
            id,
            delay,
            deadline: Instant::now() + delay,
        });
        id
    }

    /// Drop the pending tick. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_id(&self) -> Option<TimerId> {
        self.pending.map(|p| p.id)
    }

    /// When the pending tick is due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Delay the pending tick was scheduled with
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.map(|p| p.delay)
    }

    /// Time between two sub-steps.
    ///
    /// `segment_duration_ms` is the scaled animation time of the current
    /// segment, or `None` to fall back to a fixed 100ms tick. The result is
    /// divided by `speed`. Delays under 20ms are allowed but logged.
    pub fn tick_delay(segment_duration_ms: Option<f64>, intermediate_count: usize, speed: u32) -> Duration {
        let base_ms = match segment_duration_ms {
            Some(ms) => ms / intermediate_count.max(1) as f64,
            None => FALLBACK_TICK.as_millis() as f64,
        };
        let ms = (base_ms / speed.max(1) as f64).max(0.0);
        let delay = Duration::from_secs_f64(ms / 1000.0);

        if delay < MIN_VISIBLE_TICK {
            warn!(
                delay_ms = ms,
                speed,
                "Tick delay below 20ms, segment timing will not be visible; adjust duration unit or speed"
            );
        }
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::log_capture::capture;

    #[test]
    fn test_single_pending_tick() {
        let mut scheduler = ProgressScheduler::new();
        assert!(!scheduler.is_pending());

        let first = scheduler.schedule(Duration::from_millis(500));
        let second = scheduler.schedule(Duration::from_millis(250));
        assert_ne!(first, second);
        assert_eq!(scheduler.pending_id(), Some(second));
        assert_eq!(scheduler.pending_delay(), Some(Duration::from_millis(250)));

        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        assert!(scheduler.deadline().is_none());
    }

    #[test]
    fn test_tick_delay_scaled() {
        // 60s segment in minute units -> 10s, over 10 sub-steps
        let delay = ProgressScheduler::tick_delay(Some(10_000.0), 10, 1);
        assert_eq!(delay, Duration::from_millis(1000));

        let delay = ProgressScheduler::tick_delay(Some(10_000.0), 10, 4);
        assert_eq!(delay, Duration::from_millis(250));
    }

    #[test]
    fn test_tick_delay_unscaled() {
        assert_eq!(ProgressScheduler::tick_delay(None, 500, 1), Duration::from_millis(100));
        assert_eq!(ProgressScheduler::tick_delay(None, 500, 2), Duration::from_millis(50));
    }

    #[test]
    fn test_short_tick_is_logged() {
        let (delay, logs) = capture(|| ProgressScheduler::tick_delay(Some(100.0), 10, 1));
        assert!(delay < MIN_VISIBLE_TICK);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Tick delay below 20ms"));

        let (_, logs) = capture(|| ProgressScheduler::tick_delay(Some(10_000.0), 10, 1));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_degenerate_delays_do_not_panic() {
        assert_eq!(ProgressScheduler::tick_delay(Some(0.0), 500, 1), Duration::ZERO);
        assert_eq!(ProgressScheduler::tick_delay(Some(-5_000.0), 500, 1), Duration::ZERO);
        assert_eq!(ProgressScheduler::tick_delay(None, 500, 0), Duration::from_millis(100));
    }
}
