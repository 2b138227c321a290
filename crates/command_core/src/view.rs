use async_trait::async_trait;
use shared::domain::{CursorKind, EntityId, InteractionMode, PointerEvent, Rect};
use tokio::sync::broadcast;

/// The drawing view commands operate on. Rendering and picking live behind
/// this trait.
#[async_trait]
pub trait View: Send + Sync {
    fn mode(&self) -> InteractionMode;
    fn set_mode(&self, mode: InteractionMode);
    fn set_cursor(&self, cursor: CursorKind);
    /// New receiver for pointer-move events, starting at the next event.
    fn pointer_moves(&self) -> broadcast::Receiver<PointerEvent>;
    /// Waits for the user to drag out a rectangle.
    async fn selection_box(&self) -> anyhow::Result<Rect>;
    fn zoom_to(&self, rect: Rect, margin: f64);
    fn zoom_to_extents(&self);
    fn entities_in(&self, rect: Rect) -> Vec<EntityId>;
}
