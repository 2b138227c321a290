//! Selected entities of one view, with add/remove notifications.

use std::collections::HashSet;

use parking_lot::Mutex;
use shared::{domain::EntityId, events::EventChannel, protocol::SelectionChange};

#[derive(Debug, Default)]
pub struct SelectionSet {
    ids: Mutex<HashSet<EntityId>>,
    added: EventChannel<SelectionChange>,
    removed: EventChannel<SelectionChange>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires for every `add` call with exactly the ids passed, including ids
    /// that were already selected.
    pub fn added(&self) -> &EventChannel<SelectionChange> {
        &self.added
    }

    /// Fires for every `delete` call with exactly the ids passed, and once per
    /// non-empty `clear`.
    pub fn removed(&self) -> &EventChannel<SelectionChange> {
        &self.removed
    }

    pub fn add(&self, ids: impl IntoIterator<Item = EntityId>) {
        let ids: Vec<EntityId> = ids.into_iter().collect();
        self.ids.lock().extend(ids.iter().cloned());
        self.added.dispatch(&SelectionChange { ids });
    }

    pub fn delete(&self, ids: impl IntoIterator<Item = EntityId>) {
        let ids: Vec<EntityId> = ids.into_iter().collect();
        {
            let mut current = self.ids.lock();
            for id in &ids {
                current.remove(id);
            }
        }
        self.removed.dispatch(&SelectionChange { ids });
    }

    pub fn has(&self, id: &EntityId) -> bool {
        self.ids.lock().contains(id)
    }

    pub fn clear(&self) {
        let mut previous: Vec<EntityId> = self.ids.lock().drain().collect();
        if previous.is_empty() {
            return;
        }
        previous.sort();
        self.removed.dispatch(&SelectionChange { ids: previous });
    }

    /// Sorted snapshot of the current members.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.ids.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
