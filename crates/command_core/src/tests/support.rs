//! Recording [`View`] double shared by the unit tests.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::domain::{CursorKind, EntityId, InteractionMode, Point, PointerEvent, Rect};
use tokio::sync::{broadcast, mpsc};

use crate::view::View;

pub(crate) struct RecordingView {
    mode: Mutex<InteractionMode>,
    cursor: Mutex<CursorKind>,
    pointer: broadcast::Sender<PointerEvent>,
    box_tx: mpsc::UnboundedSender<Rect>,
    box_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Rect>>,
    zooms: Mutex<Vec<(Rect, f64)>>,
    extents_zooms: Mutex<usize>,
    entities: Mutex<Vec<(EntityId, Point)>>,
    cursor_history: Mutex<Vec<CursorKind>>,
}

impl RecordingView {
    pub(crate) fn new() -> Arc<Self> {
        let (pointer, _) = broadcast::channel(64);
        let (box_tx, box_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            mode: Mutex::new(InteractionMode::Selection),
            cursor: Mutex::new(CursorKind::Crosshair),
            pointer,
            box_tx,
            box_rx: tokio::sync::Mutex::new(box_rx),
            zooms: Mutex::new(Vec::new()),
            extents_zooms: Mutex::new(0),
            entities: Mutex::new(Vec::new()),
            cursor_history: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn move_pointer(&self, x: f64, y: f64) {
        let _ = self.pointer.send(PointerEvent::at(x, y));
    }

    pub(crate) fn supply_box(&self, rect: Rect) {
        self.box_tx.send(rect).expect("box receiver alive");
    }

    pub(crate) fn place(&self, id: &str, x: f64, y: f64) {
        self.entities
            .lock()
            .push((EntityId::new(id), Point::new(x, y)));
    }

    pub(crate) fn cursor(&self) -> CursorKind {
        *self.cursor.lock()
    }

    pub(crate) fn cursor_history(&self) -> Vec<CursorKind> {
        self.cursor_history.lock().clone()
    }

    pub(crate) fn zooms(&self) -> Vec<(Rect, f64)> {
        self.zooms.lock().clone()
    }

    pub(crate) fn extents_zooms(&self) -> usize {
        *self.extents_zooms.lock()
    }
}

#[async_trait]
impl View for RecordingView {
    fn mode(&self) -> InteractionMode {
        *self.mode.lock()
    }

    fn set_mode(&self, mode: InteractionMode) {
        *self.mode.lock() = mode;
    }

    fn set_cursor(&self, cursor: CursorKind) {
        *self.cursor.lock() = cursor;
        self.cursor_history.lock().push(cursor);
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
            .context("selection box source closed")
    }

    fn zoom_to(&self, rect: Rect, margin: f64) {
        self.zooms.lock().push((rect, margin));
    }

    fn zoom_to_extents(&self) {
        *self.extents_zooms.lock() += 1;
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
