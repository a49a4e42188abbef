//! Listeners notified about level loading.

use std::sync::Arc;

use crate::catalog::LevelInfo;

use super::session::LevelSession;

/// Observer of the level lifecycle. Every callback defaults to a no-op.
///
/// Callbacks take `&self`; listeners that record state use interior
/// mutability. References passed in are only valid for the call.
pub trait LevelSystemListener: Send + Sync {
    fn on_level_not_found(&self, _level: &str) {}
    fn on_loading_start(&self, _info: &LevelInfo) {}
    fn on_loading_error(&self, _info: &LevelInfo, _reason: &str) {}
    fn on_loading_progress(&self, _info: &LevelInfo, _percent: u32) {}
    fn on_loading_complete(&self, _session: &LevelSession) {}
    fn on_unload_complete(&self, _session: &LevelSession) {}
}

/// Listeners in registration order.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn LevelSystemListener>>,
}

impl ListenerRegistry {
    /// Register a listener. Adding the same `Arc` twice is a no-op.
    pub fn add(&mut self, listener: Arc<dyn LevelSystemListener>) {
        if !self.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    /// Remove a listener. Removing an unknown one is a no-op.
    pub fn remove(&mut self, listener: &Arc<dyn LevelSystemListener>) {
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
    }

    pub fn contains(&self, listener: &Arc<dyn LevelSystemListener>) -> bool {
        self.listeners.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LevelSystemListener>> {
        self.listeners.iter()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Counter(AtomicU32);

    impl LevelSystemListener for Counter {
        fn on_level_not_found(&self, _level: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let counter = Arc::new(Counter::default());
        let listener: Arc<dyn LevelSystemListener> = counter.clone();
        let mut registry = ListenerRegistry::default();

        registry.add(listener.clone());
        registry.add(listener.clone());
        assert_eq!(registry.len(), 1);

        for l in registry.iter() {
            l.on_level_not_found("nowhere");
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        registry.remove(&listener);
        registry.remove(&listener);
        assert!(registry.is_empty());
    }
}
