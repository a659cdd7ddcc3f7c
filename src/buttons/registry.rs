//! Registry mapping control identifiers to click handlers.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::platform::{ComponentEvent, Control};

type Handler = Arc<dyn Fn(ComponentEvent) + Send + Sync>;

/// Thread-safe mapping from control identifiers to callbacks.
///
/// The registry supports concurrent registration, removal and dispatch
/// without external locking. Keys are unique; registering an identifier a
/// second time replaces the previous handler.
///
/// Handlers run on the caller of [`dispatch`](Self::dispatch), which for
/// inbound events is the delivery task. Handlers that need to do real work
/// should spawn it.
///
/// # Examples
///
/// ```
/// use cogwheel::{ButtonRegistry, ComponentEvent, ResponseTarget};
///
/// let registry = ButtonRegistry::new();
/// registry.register("confirm", |event| {
///     println!("clicked {}", event.component_id);
/// });
///
/// registry.dispatch(ComponentEvent {
///     component_id: "confirm".to_string(),
///     target: ResponseTarget::new("interaction-1"),
/// });
///
/// registry.unregister("confirm");
/// ```
#[derive(Default)]
pub struct ButtonRegistry {
    handlers: DashMap<String, Handler>,
}

impl ButtonRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ButtonRegistry {
            handlers: DashMap::new(),
        }
    }

    /// Registers a handler for a control identifier.
    ///
    /// Overwrites any existing handler for the same identifier. Returns the
    /// registry for chaining.
    pub fn register<F>(&self, id: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(ComponentEvent) + Send + Sync + 'static,
    {
        self.handlers.insert(id.into(), Arc::new(handler));
        self
    }

    /// Registers a handler for a control, deriving the key from the
    /// control's own identifier.
    pub fn register_control<F>(&self, control: &Control, handler: F) -> &Self
    where
        F: Fn(ComponentEvent) + Send + Sync + 'static,
    {
        self.register(control.id.clone(), handler)
    }

    /// Removes the handler for an identifier.
    ///
    /// Removing an identifier that was never registered, or was already
    /// removed, is a no-op.
    pub fn unregister(&self, id: &str) {
        self.handlers.remove(id);
    }

    /// Removes each of the given identifiers in turn.
    pub fn unregister_all<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.unregister(id);
        }
    }

    /// Invokes the handler registered for the event's control identifier.
    ///
    /// Events for unknown identifiers are dropped silently; a click on an
    /// expired control is expected traffic, not an error.
    pub fn dispatch(&self, event: ComponentEvent) {
        // Clone the handler out of the map so it may re-enter the registry.
        let handler = self
            .handlers
            .get(event.component_id.as_str())
            .map(|entry| Arc::clone(entry.value()));

        match handler {
            Some(handler) => handler(event),
            None => debug!("no handler registered for control '{}'", event.component_id),
        }
    }

    /// Returns whether a handler is registered for the identifier.
    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether the registry holds no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ResponseTarget;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn click(id: &str) -> ComponentEvent {
        ComponentEvent {
            component_id: id.to_string(),
            target: ResponseTarget::new("interaction-1"),
        }
    }

    #[test]
    fn test_dispatch_invokes_registered_handler() {
        let registry = ButtonRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        registry.register("go", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(click("go"));
        registry.dispatch(click("go"));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dispatch_unknown_id_is_silent() {
        let registry = ButtonRegistry::new();
        registry.dispatch(click("never-registered"));
    }

    #[test]
    fn test_unregister_stops_dispatch() {
        let registry = ButtonRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        registry.register("go", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        registry.unregister("go");
        registry.dispatch(click("go"));

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_absent_id_is_noop() {
        let registry = ButtonRegistry::new();
        registry.unregister("missing");
        registry.unregister_all(["a", "b", "a"]);
    }

    #[test]
    fn test_reregister_replaces_handler() {
        let registry = ButtonRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = Arc::clone(&first);
        registry.register("go", move |_| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = Arc::clone(&second);
        registry.register("go", move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(click("go"));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_control_uses_control_id() {
        let registry = ButtonRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let control = Control::new("menu-forward", "➡");
        registry.register_control(&control, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(click("menu-forward"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_all_removes_each() {
        let registry = ButtonRegistry::new();
        registry.register("a", |_| {}).register("b", |_| {});
        assert_eq!(registry.len(), 2);

        registry.unregister_all(["a", "b", "c"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handler_may_mutate_registry_during_dispatch() {
        let registry = Arc::new(ButtonRegistry::new());
        let registry_clone = Arc::clone(&registry);

        registry.register("once", move |event| {
            registry_clone.unregister(&event.component_id);
        });

        registry.dispatch(click("once"));
        assert!(!registry.contains("once"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_and_dispatch() {
        let registry = Arc::new(ButtonRegistry::new());
        let count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            let count = Arc::clone(&count);
            handles.push(tokio::spawn(async move {
                let id = format!("control-{i}");
                let count = Arc::clone(&count);
                registry.register(id.clone(), move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                });
                registry.dispatch(click(&id));
                registry.unregister(&id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(count.load(Ordering::SeqCst), 16);
        assert!(registry.is_empty());
    }
}
