use crate::core::{EntityIcon, LatLng, LineStyle};
use crate::render::{EntityHandle, OverlayHandle, RendererAdapter};
use tracing::{debug, trace};

/// Renderer that draws nothing and logs every call
///
/// Position updates are logged at `trace` level, everything else at `debug`.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    next_handle: u64,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RendererAdapter for TraceRenderer {
    fn create_full_path_overlay(&mut self, points: &[LatLng], style: &LineStyle) -> OverlayHandle {
        let handle = OverlayHandle(self.handle());
        debug!(?handle, points = points.len(), color = %style.line_color, arrows = style.has_arrows(), "Full path overlay created");
        handle
    }

    fn update_full_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]) {
        debug!(?handle, points = points.len(), "Full path overlay updated");
    }

    fn create_traveled_path_overlay(&mut self, initial: Option<LatLng>, style: &LineStyle) -> OverlayHandle {
        let handle = OverlayHandle(self.handle());
        debug!(?handle, ?initial, color = %style.line_color, "Traveled path overlay created");
        handle
    }

    fn update_traveled_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]) {
        trace!(?handle, points = points.len(), "Traveled path updated");
    }

    fn create_moving_entity(&mut self, icon: &EntityIcon, position: Option<LatLng>, rotation: f64) -> EntityHandle {
        let handle = EntityHandle(self.handle());
        debug!(?handle, icon = %icon.url, ?position, rotation, "Moving entity created");
        handle
    }

    fn update_entity_position(&mut self, handle: EntityHandle, lat: f64, lng: f64) {
        trace!(?handle, lat, lng, "Entity moved");
    }

    fn update_entity_rotation(&mut self, handle: EntityHandle, angle_degrees: f64) {
        trace!(?handle, angle_degrees, "Entity rotated");
    }

    fn follow_camera(&mut self, lat: f64, lng: f64, zoom: Option<f64>) {
        debug!(lat, lng, ?zoom, "Camera follow");
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        debug!(?handle, "Overlay removed");
    }

    fn remove_entity(&mut self, handle: EntityHandle) {
        debug!(?handle, "Entity removed");
    }
}
