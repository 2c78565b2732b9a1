//! Change notification for the presentation layer
//!
//! Listeners are invoked after a state change has been committed and the
//! engine lock released, at most once per accepted sample.

use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::core::types::{Coordinate, FixSource};
use crate::validation::error::{FusionError, FusionResult};

/// State changes observable from outside the engine
#[derive(Debug, Clone, PartialEq)]
pub enum FusionEvent {
    /// A new position was fixed or dead-reckoned
    PositionUpdated {
        coordinate: Coordinate,
        source: FixSource,
    },
    /// An acceleration sample was logged without a position baseline
    AccelerationBuffered { timestamp: f64 },
    HeadingUpdated { heading: f64, timestamp: f64 },
}

/// Callback function type for fusion events
pub type FusionListener = Box<dyn Fn(&FusionEvent) + Send + Sync>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

#[derive(Default)]
struct Registry {
    next_id: u32,
    listeners: BTreeMap<CallbackHandle, FusionListener>,
}

/// Thread-safe set of listeners, notified in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<Registry>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: FusionListener) -> CallbackHandle {
        let mut registry = self.inner.lock();
        registry.next_id += 1;
        let handle = CallbackHandle(registry.next_id);
        registry.listeners.insert(handle, listener);
        handle
    }

    pub fn unregister(&self, handle: CallbackHandle) -> FusionResult<()> {
        match self.inner.lock().listeners.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(FusionError::UnknownListener { handle: handle.id() }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener.
    ///
    /// Listeners must not register or unregister from inside the callback.
    pub fn notify(&self, event: &FusionEvent) {
        let registry = self.inner.lock();
        for listener in registry.listeners.values() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_register_notify_unregister() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&count);
        let handle = registry.register(Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(registry.len(), 1);

        registry.notify(&FusionEvent::HeadingUpdated { heading: 10.0, timestamp: 1.0 });
        assert_eq!(count.load(Ordering::SeqCst), 1);

        registry.unregister(handle).unwrap();
        registry.notify(&FusionEvent::AccelerationBuffered { timestamp: 2.0 });
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_handle() {
        let registry = ListenerRegistry::new();
        let handle = registry.register(Box::new(|_| {}));
        registry.unregister(handle).unwrap();
        assert!(matches!(
            registry.unregister(handle),
            Err(FusionError::UnknownListener { .. })
        ));
    }

    #[test]
    fn test_handles_are_unique() {
        let registry = ListenerRegistry::new();
        let a = registry.register(Box::new(|_| {}));
        let b = registry.register(Box::new(|_| {}));
        assert_ne!(a, b);
    }
}
