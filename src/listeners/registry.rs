//! # Copy-on-write listener registry.
//!
//! [`ListenerRegistry`] holds listeners in registration order behind an
//! [`ArcSwap`]. Readers take an immutable snapshot with a single atomic load; writers
//! build a new sequence from the current one and publish it with a CAS retry loop
//! (`rcu`).
//!
//! ## Architecture
//! ```text
//! register(L3)                         dispatch pass
//!   │                                     │
//!   ├─ load  [L1, L2]                     ├─ snapshot() ─► [L1, L2]   (pinned)
//!   ├─ build [L1, L2, L3]                 │
//!   └─ CAS ──► live = [L1, L2, L3]        └─ invokes L1, L2 only
//! ```
//!
//! ## Rules
//! - A snapshot never changes after it is taken.
//! - Mutation is safe from any thread, including from inside a listener callback that is
//!   iterating an older snapshot.
//! - Duplicate registrations are kept; each one is invoked.
//! - Handle identity (pointer), not value equality, decides what `unregister` removes.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::listener::{Listener, ListenerRef};

/// Immutable point-in-time view of the registry.
pub type Snapshot = Arc<Vec<ListenerRef>>;

/// Thread-safe ordered listener collection.
pub struct ListenerRegistry {
    live: ArcSwap<Vec<ListenerRef>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            live: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Creates a registry holding `listeners` in order.
    pub fn with_listeners(listeners: Vec<ListenerRef>) -> Self {
        Self {
            live: ArcSwap::from_pointee(listeners),
        }
    }

    /// Appends a listener.
    pub fn register(&self, listener: ListenerRef) {
        self.live.rcu(|cur| {
            let mut next = Vec::clone(cur);
            next.push(Arc::clone(&listener));
            next
        });
    }

    /// Removes the first registration of `listener`.
    ///
    /// Accepts `&*handle` as well as `self` from inside a listener callback.
    /// Returns false if it was not registered.
    pub fn unregister(&self, listener: &dyn Listener) -> bool {
        let target = std::ptr::from_ref(listener).cast::<()>();
        let mut removed = false;
        self.live.rcu(|cur| {
            let mut next = Vec::clone(cur);
            removed = match next
                .iter()
                .position(|l| Arc::as_ptr(l).cast::<()>() == target)
            {
                Some(idx) => {
                    next.remove(idx);
                    true
                }
                None => false,
            };
            next
        });
        removed
    }

    /// Point-in-time copy of the registered listeners.
    pub fn snapshot(&self) -> Snapshot {
        self.live.load_full()
    }

    /// Drops every listener.
    pub fn clear(&self) {
        self.live.store(Arc::new(Vec::new()));
    }

    pub fn len(&self) -> usize {
        self.live.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.load().is_empty()
    }

    /// Listener names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.live.load().iter().map(|l| l.name().to_string()).collect()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::listeners::ListenerFn;

    fn named(name: &'static str) -> ListenerRef {
        ListenerFn::arc_deploy_only(name, |_item, _cx| async { Ok::<(), ListenerError>(()) })
    }

    #[test]
    fn keeps_registration_order() {
        let reg = ListenerRegistry::new();
        reg.register(named("a"));
        reg.register(named("b"));
        reg.register(named("c"));
        assert_eq!(reg.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let a = named("a");
        let b = named("b");
        let reg = ListenerRegistry::with_listeners(vec![a.clone(), b.clone()]);

        let snap = reg.snapshot();
        assert!(reg.unregister(&*a));
        reg.register(named("c"));

        let names: Vec<&str> = snap.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reg.names(), vec!["b", "c"]);
    }

    #[test]
    fn duplicates_are_kept_and_removed_one_at_a_time() {
        let a = named("a");
        let reg = ListenerRegistry::new();
        reg.register(a.clone());
        reg.register(a.clone());
        assert_eq!(reg.len(), 2);

        assert!(reg.unregister(&*a));
        assert_eq!(reg.len(), 1);
        assert!(reg.unregister(&*a));
        assert!(!reg.unregister(&*a));
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_matches_handle_not_name() {
        let reg = ListenerRegistry::new();
        reg.register(named("same"));
        let other = named("same");
        assert!(!reg.unregister(&*other));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn clear_empties_registry() {
        let reg = ListenerRegistry::with_listeners(vec![named("a"), named("b")]);
        reg.clear();
        assert!(reg.is_empty());
    }

    #[test]
    fn concurrent_registration_loses_nothing() {
        let reg = Arc::new(ListenerRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        reg.register(named("t"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.len(), 400);
    }
}
