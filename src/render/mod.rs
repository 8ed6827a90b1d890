pub mod recording;
pub mod trace;

pub use recording::{RecordingRenderer, RenderCall, RenderLog};
pub use trace::TraceRenderer;

use crate::core::{EntityIcon, LatLng, LineStyle};
use serde::Serialize;

/// Opaque handle to a path overlay owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OverlayHandle(pub u64);

/// Opaque handle to the moving entity owned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityHandle(pub u64);

/// Drawing surface for a replayed track
///
/// The player only talks to the map through this trait, so any mapping
/// backend can be plugged in:
/// - [`RecordingRenderer`] keeps every call in memory
/// - [`TraceRenderer`] logs every call
pub trait RendererAdapter: Send {
    /// Draw the whole track
    fn create_full_path_overlay(&mut self, points: &[LatLng], style: &LineStyle) -> OverlayHandle;

    /// Replace the points of the whole-track overlay
    fn update_full_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]);

    /// Draw the part of the track already travelled
    fn create_traveled_path_overlay(&mut self, initial: Option<LatLng>, style: &LineStyle) -> OverlayHandle;

    fn update_traveled_path_overlay(&mut self, handle: OverlayHandle, points: &[LatLng]);

    /// Place the moving entity. `rotation` is in degrees.
    fn create_moving_entity(
        &mut self,
        icon: &EntityIcon,
        position: Option<LatLng>,
        rotation: f64,
    ) -> EntityHandle;

    fn update_entity_position(&mut self, handle: EntityHandle, lat: f64, lng: f64);

    fn update_entity_rotation(&mut self, handle: EntityHandle, angle_degrees: f64);

    /// Center the view. `None` keeps the current zoom level.
    fn follow_camera(&mut self, lat: f64, lng: f64, zoom: Option<f64>);

    fn remove_overlay(&mut self, handle: OverlayHandle);

    fn remove_entity(&mut self, handle: EntityHandle);
}
