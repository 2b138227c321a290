//! Typed synchronous publish/subscribe channel.
//!
//! Listeners run on the dispatching thread, in registration order. The same
//! closure may be registered more than once and will then be called once per
//! registration.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct EventChannel<T> {
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        match listeners.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Calls every listener registered at the time of the call. The list is
    /// snapshotted first, so listeners may add or remove listeners.
    pub fn dispatch(&self, payload: &T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(payload);
        }
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_in_registration_order_without_dedup() {
        let channel = EventChannel::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let record = {
            let seen = Arc::clone(&seen);
            move |tag: &'static str| {
                let seen = Arc::clone(&seen);
                move |value: &u32| seen.lock().push(format!("{tag}:{value}"))
            }
        };
        channel.add_listener(record("a"));
        channel.add_listener(record("b"));
        channel.add_listener(record("a"));

        channel.dispatch(&7);
        assert_eq!(*seen.lock(), vec!["a:7", "b:7", "a:7"]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let channel = EventChannel::<()>::new();
        let hits = Arc::new(AtomicU64::new(0));
        let id = {
            let hits = Arc::clone(&hits);
            channel.add_listener(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert!(channel.remove_listener(id));
        assert!(!channel.remove_listener(id));
        channel.dispatch(&());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
