// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Priority-ordered publish/subscribe hook registry
//!
//! Producers fire named hooks; subscribers register callbacks with a
//! priority (lower runs first, ties preserve registration order). A
//! panicking subscriber never blocks the rest of the firing.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Default priority for registrations that do not specify one
pub const DEFAULT_PRIORITY: i32 = 10;

/// Hook callback type
///
/// Arguments are JSON values so producers and subscribers agree on a
/// serialization-friendly shape regardless of which subsystem fires.
pub type HookCallback = Arc<dyn Fn(&[Value]) + Send + Sync + 'static>;

/// One registered subscriber
#[derive(Clone)]
struct HookEntry {
    callback: HookCallback,
    priority: i32,
    /// Registration sequence, keeps equal priorities in insertion order
    seq: u64,
}

/// Named hook registry with priority-ordered firing
pub struct HookRegistry {
    hooks: RwLock<HashMap<String, Vec<HookEntry>>>,
    next_seq: AtomicU64,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Register a callback with the default priority
    pub fn add(&self, name: impl Into<String>, callback: HookCallback) {
        self.register(name, callback, DEFAULT_PRIORITY);
    }

    /// Register a callback under a hook name
    ///
    /// Lower priorities run first; equal priorities run in registration
    /// order. Registering the same callback twice produces two invocations.
    pub fn register(&self, name: impl Into<String>, callback: HookCallback, priority: i32) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let mut hooks = self.hooks.write();
        let entries = hooks.entry(name.into()).or_default();
        entries.push(HookEntry {
            callback,
            priority,
            seq,
        });
        entries.sort_by_key(|e| (e.priority, e.seq));
    }

    /// Check whether a specific callback identity is registered
    pub fn has(&self, name: &str, callback: &HookCallback) -> bool {
        self.hooks
            .read()
            .get(name)
            .map(|entries| {
                entries
                    .iter()
                    .any(|e| Arc::ptr_eq(&e.callback, callback))
            })
            .unwrap_or(false)
    }

    /// Remove the first registration matching the callback identity
    ///
    /// Returns true if a registration was removed. An emptied hook is
    /// dropped from the map entirely.
    pub fn unregister(&self, name: &str, callback: &HookCallback) -> bool {
        let mut hooks = self.hooks.write();
        let Some(entries) = hooks.get_mut(name) else {
            return false;
        };
        let Some(pos) = entries
            .iter()
            .position(|e| Arc::ptr_eq(&e.callback, callback))
        else {
            return false;
        };
        entries.remove(pos);
        if entries.is_empty() {
            hooks.remove(name);
        }
        true
    }

    /// Fire a hook, invoking every subscriber in priority order
    ///
    /// A hook with no registrations is a silent no-op. Subscribers run
    /// synchronously on the calling task; a panic in one is caught and
    /// logged, and the remaining subscribers still run.
    pub fn fire(&self, name: &str, args: &[Value]) {
        // Snapshot outside the lock so subscribers can re-enter the registry.
        let entries: Vec<HookEntry> = match self.hooks.read().get(name) {
            Some(entries) => entries.clone(),
            None => return,
        };

        tracing::debug!(hook = name, subscribers = entries.len(), "Firing hook");

        for entry in entries {
            let result = catch_unwind(AssertUnwindSafe(|| (entry.callback)(args)));
            if let Err(panic) = result {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic".to_string());
                tracing::warn!(hook = name, error = %message, "Hook subscriber panicked");
            }
        }
    }

    /// Number of subscribers currently registered for a hook
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.hooks.read().get(name).map(|e| e.len()).unwrap_or(0)
    }

    /// Whether any subscriber is registered for a hook
    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks.read().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> HookCallback {
        Arc::new(move |_args| log.lock().push(tag))
    }

    #[test]
    fn test_priority_order() {
        let registry = HookRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register("x", recorder(log.clone(), "a"), 5);
        registry.register("x", recorder(log.clone(), "b"), 1);
        registry.fire("x", &[]);

        assert_eq!(*log.lock(), vec!["b", "a"]);
    }

    #[test]
    fn test_equal_priority_preserves_registration_order() {
        let registry = HookRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register("x", recorder(log.clone(), "first"), 10);
        registry.register("x", recorder(log.clone(), "second"), 10);
        registry.register("x", recorder(log.clone(), "early"), 1);
        registry.fire("x", &[]);

        assert_eq!(*log.lock(), vec!["early", "first", "second"]);
    }

    #[test]
    fn test_fire_unknown_hook_is_noop() {
        let registry = HookRegistry::new();
        registry.fire("nothing-here", &[Value::from(1)]);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_others() {
        let registry = HookRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register("x", recorder(log.clone(), "before"), 1);
        registry.register("x", Arc::new(|_| panic!("bad subscriber")), 5);
        registry.register("x", recorder(log.clone(), "after"), 9);
        registry.fire("x", &[]);

        assert_eq!(*log.lock(), vec!["before", "after"]);
    }

    #[test]
    fn test_args_are_passed_through() {
        let registry = HookRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();

        registry.add(
            "payload",
            Arc::new(move |args| seen2.lock().extend(args.to_vec())),
        );
        registry.fire("payload", &[Value::from("hello"), Value::from(42)]);

        assert_eq!(*seen.lock(), vec![Value::from("hello"), Value::from(42)]);
    }

    #[test]
    fn test_has_and_unregister_by_identity() {
        let registry = HookRegistry::new();
        let cb: HookCallback = Arc::new(|_| {});
        let other: HookCallback = Arc::new(|_| {});

        registry.add("x", cb.clone());
        assert!(registry.has("x", &cb));
        assert!(!registry.has("x", &other));

        assert!(registry.unregister("x", &cb));
        assert!(!registry.has("x", &cb));
        // Emptied hook disappears from the map
        assert!(!registry.has_hook("x"));
        assert!(!registry.unregister("x", &cb));
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let registry = HookRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let cb = recorder(log.clone(), "dup");

        registry.add("x", cb.clone());
        registry.add("x", cb);
        registry.fire("x", &[]);

        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_subscriber_can_reenter_registry() {
        let registry = Arc::new(HookRegistry::new());
        let inner = registry.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = log.clone();

        registry.add(
            "outer",
            Arc::new(move |_| {
                inner.fire("inner", &[]);
                log2.lock().push("outer");
            }),
        );
        registry.add("inner", recorder(log.clone(), "inner"));
        registry.fire("outer", &[]);

        assert_eq!(*log.lock(), vec!["inner", "outer"]);
    }
}
