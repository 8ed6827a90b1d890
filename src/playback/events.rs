//! Publish/subscribe channels for playback notifications.
//!
//! Events are queued while the player is mid-step and only dispatched by
//! [`EventBus::flush`], which the player calls once the operation or tick
//! that produced them has finished. Listeners therefore never observe a
//! half-updated player.

use crate::core::Waypoint;
use crate::playback::{LifecycleStatus, MovementStatus};
use crate::render::{EntityHandle, OverlayHandle};
use serde::Serialize;
use std::sync::Arc;

pub type ProgressListener = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;
pub type ArrivalListener = Arc<dyn Fn(&Waypoint) + Send + Sync>;

/// Named event channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    ProgressUpdate,
    WaypointArrival,
}

/// Payload of the progress channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub speed: u32,
    pub overall_progress: f64,
    pub progress_step: f64,
    pub movement: MovementStatus,
    pub lifecycle: LifecycleStatus,
    pub entity: Option<EntityHandle>,
    pub traveled_path: Option<OverlayHandle>,
}

#[derive(Debug, Clone)]
enum PendingEvent {
    Arrival(Waypoint),
    Progress(ProgressUpdate),
}

/// Listener set keyed on `Arc` identity
struct Listeners<T: ?Sized> {
    entries: Vec<Arc<T>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: ?Sized> Listeners<T> {
    fn add(&mut self, listener: Arc<T>) -> bool {
        if self.entries.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        self.entries.push(listener);
        true
    }

    fn remove(&mut self, listener: &Arc<T>) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| !Arc::ptr_eq(l, listener));
        self.entries.len() != before
    }
}

/// Typed observer registry with deferred dispatch
#[derive(Default)]
pub struct EventBus {
    progress: Listeners<dyn Fn(&ProgressUpdate) + Send + Sync>,
    arrival: Listeners<dyn Fn(&Waypoint) + Send + Sync>,
    pending: Vec<PendingEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a progress listener. Returns false if it was already subscribed.
    pub fn subscribe_progress(&mut self, listener: ProgressListener) -> bool {
        self.progress.add(listener)
    }

    pub fn unsubscribe_progress(&mut self, listener: &ProgressListener) -> bool {
        self.progress.remove(listener)
    }

    /// Add a waypoint-arrival listener. Returns false if it was already subscribed.
    pub fn subscribe_arrival(&mut self, listener: ArrivalListener) -> bool {
        self.arrival.add(listener)
    }

    pub fn unsubscribe_arrival(&mut self, listener: &ArrivalListener) -> bool {
        self.arrival.remove(listener)
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::ProgressUpdate => self.progress.entries.len(),
            Channel::WaypointArrival => self.arrival.entries.len(),
        }
    }

    /// Queue a progress update for the next flush
    pub fn publish_progress(&mut self, update: ProgressUpdate) {
        self.pending.push(PendingEvent::Progress(update));
    }

    /// Queue a waypoint arrival for the next flush
    pub fn publish_arrival(&mut self, waypoint: Waypoint) {
        self.pending.push(PendingEvent::Arrival(waypoint));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deliver every queued event in publication order
    pub fn flush(&mut self) {
        for event in std::mem::take(&mut self.pending) {
            match event {
                PendingEvent::Progress(update) => {
                    for listener in &self.progress.entries {
                        listener(&update);
                    }
                }
                PendingEvent::Arrival(waypoint) => {
                    for listener in &self.arrival.entries {
                        listener(&waypoint);
                    }
                }
            }
        }
    }

    /// Drop all listeners and anything still queued
    pub fn clear(&mut self) {
        self.progress.entries.clear();
        self.arrival.entries.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawWaypoint;
    use chrono::Utc;
    use std::sync::Mutex;

    fn update(progress: f64) -> ProgressUpdate {
        ProgressUpdate {
            speed: 1,
            overall_progress: progress,
            progress_step: 0.5,
            movement: MovementStatus::Moving,
            lifecycle: LifecycleStatus::Progress,
            entity: None,
            traveled_path: None,
        }
    }

    #[test]
    fn test_duplicate_subscription_is_ignored() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let listener: ProgressListener = Arc::new(move |_: &ProgressUpdate| *counter.lock().unwrap() += 1);

        assert!(bus.subscribe_progress(listener.clone()));
        assert!(!bus.subscribe_progress(listener.clone()));
        assert_eq!(bus.subscriber_count(Channel::ProgressUpdate), 1);

        bus.publish_progress(update(1.0));
        bus.flush();
        assert_eq!(*hits.lock().unwrap(), 1);

        assert!(bus.unsubscribe_progress(&listener));
        assert!(!bus.unsubscribe_progress(&listener));
        bus.publish_progress(update(2.0));
        bus.flush();
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_dispatch_is_deferred_and_ordered() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        bus.subscribe_arrival(Arc::new(move |wp: &Waypoint| s.lock().unwrap().push(format!("arrive {}", wp.lat))));
        let s = seen.clone();
        bus.subscribe_progress(Arc::new(move |u: &ProgressUpdate| {
            s.lock().unwrap().push(format!("progress {}", u.overall_progress))
        }));

        let wp = Waypoint::from_raw(&RawWaypoint::new(0.0, 7.0, Utc::now()));
        bus.publish_arrival(wp);
        bus.publish_progress(update(50.0));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bus.pending_count(), 2);

        bus.flush();
        assert_eq!(*seen.lock().unwrap(), vec!["arrive 7".to_string(), "progress 50".to_string()]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut bus = EventBus::new();
        bus.subscribe_progress(Arc::new(|_: &ProgressUpdate| {}));
        bus.subscribe_arrival(Arc::new(|_: &Waypoint| {}));
        bus.publish_progress(update(1.0));
        bus.clear();
        assert_eq!(bus.subscriber_count(Channel::ProgressUpdate), 0);
        assert_eq!(bus.subscriber_count(Channel::WaypointArrival), 0);
        assert_eq!(bus.pending_count(), 0);
    }
}
