//! A [`View`] with no renderer: it keeps the interaction state, answers
//! picking from a flat entity list, and reports every visible change as a
//! [`ViewerEvent`].

use anyhow::Context;
use async_trait::async_trait;
use command_core::View;
use parking_lot::Mutex;
use shared::{
    domain::{CursorKind, EntityId, InteractionMode, Point, PointerEvent, Rect},
    protocol::ViewerEvent,
};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

pub struct HeadlessView {
    mode: Mutex<InteractionMode>,
    entities: Mutex<Vec<(EntityId, Point)>>,
    pointer: broadcast::Sender<PointerEvent>,
    box_tx: mpsc::UnboundedSender<Rect>,
    box_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Rect>>,
    events: mpsc::UnboundedSender<ViewerEvent>,
}

impl HeadlessView {
    pub fn new(pointer_buffer: usize, events: mpsc::UnboundedSender<ViewerEvent>) -> Self {
        let (pointer, _) = broadcast::channel(pointer_buffer);
        let (box_tx, box_rx) = mpsc::unbounded_channel();
        Self {
            mode: Mutex::new(InteractionMode::default()),
            entities: Mutex::new(Vec::new()),
            pointer,
            box_tx,
            box_rx: tokio::sync::Mutex::new(box_rx),
            events,
        }
    }

    pub fn place_entity(&self, id: EntityId, at: Point) {
        let mut entities = self.entities.lock();
        entities.retain(|(existing, _)| *existing != id);
        entities.push((id, at));
    }

    /// Returns how many jigs received the move.
    pub fn move_pointer(&self, at: Point) -> usize {
        self.pointer
            .send(PointerEvent { position: at })
            .unwrap_or_default()
    }

    /// Queues a rectangle for the next `selection_box` request.
    pub fn drag_box(&self, rect: Rect) {
        let _ = self.box_tx.send(rect);
    }

    fn emit(&self, event: ViewerEvent) {
        if self.events.send(event).is_err() {
            debug!("viewer event dropped; no consumer");
        }
    }
}

#[async_trait]
impl View for HeadlessView {
    fn mode(&self) -> InteractionMode {
        *self.mode.lock()
    }

    fn set_mode(&self, mode: InteractionMode) {
        let changed = {
            let mut current = self.mode.lock();
            let changed = *current != mode;
            *current = mode;
            changed
        };
        if changed {
            self.emit(ViewerEvent::ModeChanged { mode });
        }
    }

    fn set_cursor(&self, cursor: CursorKind) {
        self.emit(ViewerEvent::CursorChanged { cursor });
    }

    fn pointer_moves(&self) -> broadcast::Receiver<PointerEvent> {
        self.pointer.subscribe()
    }

    async fn selection_box(&self) -> anyhow::Result<Rect> {
        self.box_rx
            .lock()
            .await
            .recv()
            .await
            .context("selection box input closed")
    }

    fn zoom_to(&self, rect: Rect, margin: f64) {
        self.emit(ViewerEvent::ZoomedTo { rect, margin });
    }

    fn zoom_to_extents(&self) {
        self.emit(ViewerEvent::ZoomedToExtents);
    }

    fn entities_in(&self, rect: Rect) -> Vec<EntityId> {
        self.entities
            .lock()
            .iter()
            .filter(|(_, at)| rect.contains(*at))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_change_is_reported_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let view = HeadlessView::new(8, tx);

        view.set_mode(InteractionMode::Pan);
        view.set_mode(InteractionMode::Pan);

        assert!(matches!(
            rx.try_recv(),
            Ok(ViewerEvent::ModeChanged {
                mode: InteractionMode::Pan
            })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn picking_uses_latest_entity_position() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let view = HeadlessView::new(8, tx);
        view.place_entity(EntityId::new("A"), Point::new(1.0, 1.0));
        view.place_entity(EntityId::new("B"), Point::new(9.0, 9.0));
        view.place_entity(EntityId::new("A"), Point::new(20.0, 20.0));

        assert_eq!(
            view.entities_in(Rect::new(0.0, 0.0, 10.0, 10.0)),
            vec![EntityId::new("B")]
        );
    }

    #[tokio::test]
    async fn queued_box_answers_selection_request() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let view = HeadlessView::new(8, tx);
        let _moves = view.pointer_moves();

        assert_eq!(view.move_pointer(Point::new(1.0, 2.0)), 1);
        view.drag_box(Rect::new(0.0, 0.0, 3.0, 3.0));

        let rect = view.selection_box().await.expect("box");
        assert_eq!(rect, Rect::new(0.0, 0.0, 3.0, 3.0));
    }
}
