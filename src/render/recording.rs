use crate::core::{EntityIcon, LatLng, LineStyle};
use crate::render::{EntityHandle, OverlayHandle, RendererAdapter};
use std::sync::{Arc, Mutex};

/// One call made against a renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateFullPath { handle: OverlayHandle, points: Vec<LatLng>, style: LineStyle },
    UpdateFullPath { handle: OverlayHandle, points: Vec<LatLng> },
    CreateTraveledPath { handle: OverlayHandle, initial: Option<LatLng>, style: LineStyle },
    UpdateTraveledPath { handle: OverlayHandle, points: Vec<LatLng> },
    CreateEntity { handle: EntityHandle, icon: EntityIcon, position: Option<LatLng>, rotation: f64 },
    EntityPosition { handle: EntityHandle, lat: f64, lng: f64 },
    EntityRotation { handle: EntityHandle, angle: f64 },
    FollowCamera { lat: f64, lng: f64, zoom: Option<f64> },
    RemoveOverlay(OverlayHandle),
    RemoveEntity(EntityHandle),
}

/// Shared view of the calls a [`RecordingRenderer`] has received
///
/// Stays readable after the renderer itself has been handed to a player.
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RenderLog {
    fn push(&self, call: RenderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// Copy of every recorded call, oldest first
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Take all recorded calls, leaving the log empty
    pub fn take(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|mut c| std::mem::take(&mut *c)).unwrap_or_default()
    }

    /// Most recent entity position
    pub fn last_position(&self) -> Option<LatLng> {
        self.calls().iter().rev().find_map(|call| match call {
            RenderCall::EntityPosition { lat, lng, .. } => Some(LatLng::new(*lat, *lng)),
            _ => None,
        })
    }

    /// Most recent traveled-path points
    pub fn last_traveled_path(&self) -> Option<Vec<LatLng>> {
        self.calls().iter().rev().find_map(|call| match call {
            RenderCall::UpdateTraveledPath { points, .. } => Some(points.clone()),
            _ => None,
        })
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

/// In-memory renderer for tests and headless embedding
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_handle: u64,
    log: RenderLog,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the call log, usable after the renderer is moved
    pub fn log(&self) -> RenderLog {
        self.log.clone()
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RendererAdapter for RecordingRenderer {
    fn create_full_path_overlay(&mut self, points: &[LatLng], style: &LineStyle) -> OverlayHandle {
        let handle = OverlayHandle(self.handle());
        self.log.push(RenderCall::CreateFullPath { handle, points: points.to_vec(), style: style.clone() });
        handle
    }

    fn update_full_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]) {
        self.log.push(RenderCall::UpdateFullPath { handle, points: points.to_vec() });
    }

    fn create_traveled_path_overlay(&mut self, initial: Option<LatLng>, style: &LineStyle) -> OverlayHandle {
        let handle = OverlayHandle(self.handle());
        self.log.push(RenderCall::CreateTraveledPath { handle, initial, style: style.clone() });
        handle
    }

    fn update_traveled_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]) {
        self.log.push(RenderCall::UpdateTraveledPath { handle, points: points.to_vec() });
    }

    fn create_moving_entity(&mut self, icon: &EntityIcon, position: Option<LatLng>, rotation: f64) -> EntityHandle {
        let handle = EntityHandle(self.handle());
        self.log.push(RenderCall::CreateEntity { handle, icon: icon.clone(), position, rotation });
        handle
    }

    fn update_entity_position(&mut self, handle: EntityHandle, lat: f64, lng: f64) {
        self.log.push(RenderCall::EntityPosition { handle, lat, lng });
    }

    fn update_entity_rotation(&mut self, handle: EntityHandle, angle_degrees: f64) {
        self.log.push(RenderCall::EntityRotation { handle, angle: angle_degrees });
    }

    fn follow_camera(&mut self, lat: f64, lng: f64, zoom: Option<f64>) {
        self.log.push(RenderCall::FollowCamera { lat, lng, zoom });
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.log.push(RenderCall::RemoveOverlay(handle));
    }

    fn remove_entity(&mut self, handle: EntityHandle) {
        self.log.push(RenderCall::RemoveEntity(handle));
    }
}
