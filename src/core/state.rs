//! # Gate bookkeeping: deployed set, in-flight claims and the pending queue.
//!
//! [`GateState`] is the only shared mutable state on the deploy path. The dispatcher keeps
//! it behind one short-lived mutex that is **never held while listeners run**; every
//! read-then-write decision (is it deployed? is it queued? claim it) is one method call
//! under that lock.
//!
//! ## Per-identity lifecycle
//! ```text
//!            admit()                      admit() / next_ready()
//! Unseen ───────────────► Pending ─────────────────────────────► InFlight
//!    │                                                              │
//!    ├───────────── admit() (deps satisfied) ──────────────────────►│
//!    │                                                              │
//!    ◄───────────────────────── abandon() ──────────────────────────┤
//!    ▲                                                              │ complete()
//!    │                                                              ▼
//!    └──────────────────────── undeploy() ◄──────────────────── Deployed
//! ```
//!
//! ## Rules
//! - An identity is in at most one of `pending`, `in_flight`, `deployed`.
//! - `pending` keeps first-fire order and never holds the same identity twice.
//! - An item leaves `pending` exactly when it is claimed; an abandoned claim is not requeued.
//! - An identity that is in flight or deployed is a duplicate for `admit()`.

use std::collections::HashSet;

use crate::items::WorkItem;

/// Identities that completed a dispatch pass.
#[derive(Debug, Default)]
pub(crate) struct DeployedSet {
    ids: HashSet<String>,
}

impl DeployedSet {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }

    pub(crate) fn as_set(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Sorted copy.
    pub(crate) fn sorted(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

/// Items blocked on unmet dependencies, in first-fire order.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    items: Vec<WorkItem>,
}

impl PendingQueue {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.identity() == id)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.identity() == id)
    }

    /// Appends unless already queued. Returns true if appended.
    pub(crate) fn push_once(&mut self, item: WorkItem) -> bool {
        if self.contains(item.identity()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<WorkItem> {
        let idx = self.items.iter().position(|i| i.identity() == id)?;
        Some(self.items.remove(idx))
    }

    /// Removes and returns the first item satisfying `ready`.
    pub(crate) fn take_first(&mut self, ready: impl Fn(&WorkItem) -> bool) -> Option<WorkItem> {
        let idx = self.items.iter().position(ready)?;
        Some(self.items.remove(idx))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[WorkItem] {
        &self.items
    }
}

/// Decision taken by [`GateState::admit`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Already deployed or being dispatched.
    Duplicate,
    /// Dependencies satisfied; the caller now owns the in-flight claim.
    Dispatch,
    /// Dependencies missing; `first` is false for a repeated fire of a queued item.
    Queued { missing: Vec<String>, first: bool },
}

/// Shared gate state.
#[derive(Debug, Default)]
pub(crate) struct GateState {
    pub(crate) deployed: DeployedSet,
    pub(crate) pending: PendingQueue,
    in_flight: HashSet<String>,
}

impl GateState {
    /// Decides what to do with a fired deploy and records the decision.
    pub(crate) fn admit(&mut self, item: &WorkItem) -> Admission {
        let id = item.identity();
        if self.deployed.contains(id) || self.in_flight.contains(id) {
            return Admission::Duplicate;
        }

        let missing = item.missing(self.deployed.as_set());
        if missing.is_empty() {
            self.pending.remove(id);
            self.in_flight.insert(id.to_string());
            return Admission::Dispatch;
        }

        let first = self.pending.push_once(item.clone());
        Admission::Queued { missing, first }
    }

    /// Claims the first queued item whose dependencies are now all deployed.
    pub(crate) fn next_ready(&mut self) -> Option<WorkItem> {
        let deployed = self.deployed.as_set();
        let item = self.pending.take_first(|i| i.is_satisfied(deployed))?;
        self.in_flight.insert(item.identity().to_string());
        Some(item)
    }

    /// Moves a claimed identity from in-flight to deployed.
    pub(crate) fn complete(&mut self, id: &str) {
        self.in_flight.remove(id);
        self.deployed.insert(id);
    }

    /// Releases a claim whose dispatch never finished. The identity becomes unseen again,
    /// so the next fire admits it fresh. Returns true if a claim was held.
    pub(crate) fn abandon(&mut self, id: &str) -> bool {
        self.in_flight.remove(id)
    }

    /// Forgets a deployed identity. Returns true if it was deployed.
    pub(crate) fn undeploy(&mut self, id: &str) -> bool {
        self.deployed.remove(id)
    }

    pub(crate) fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Missing dependencies of a queued identity.
    pub(crate) fn missing_for(&self, id: &str) -> Option<Vec<String>> {
        self.pending
            .get(id)
            .map(|item| item.missing(self.deployed.as_set()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, deps: &[&str]) -> WorkItem {
        WorkItem::new(id).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn root_item_is_dispatched_and_claimed() {
        let mut st = GateState::default();
        assert_eq!(st.admit(&item("db", &[])), Admission::Dispatch);
        assert!(st.is_in_flight("db"));
        assert_eq!(st.admit(&item("db", &[])), Admission::Duplicate);

        st.complete("db");
        assert!(!st.is_in_flight("db"));
        assert!(st.deployed.contains("db"));
        assert_eq!(st.admit(&item("db", &[])), Admission::Duplicate);
    }

    #[test]
    fn unmet_item_is_queued_once() {
        let mut st = GateState::default();
        let app = item("app", &["db", "auth"]);
        assert_eq!(
            st.admit(&app),
            Admission::Queued {
                missing: vec!["auth".into(), "db".into()],
                first: true
            }
        );
        assert_eq!(
            st.admit(&app),
            Admission::Queued {
                missing: vec!["auth".into(), "db".into()],
                first: false
            }
        );
        assert_eq!(st.pending.len(), 1);
        assert_eq!(st.missing_for("app"), Some(vec!["auth".into(), "db".into()]));
        assert_eq!(st.missing_for("nope"), None);
    }

    #[test]
    fn next_ready_follows_queue_order_and_dependencies() {
        let mut st = GateState::default();
        st.admit(&item("a", &["b"]));
        st.admit(&item("b", &["c"]));
        st.admit(&item("d", &["c"]));
        assert!(st.next_ready().is_none());

        assert_eq!(st.admit(&item("c", &[])), Admission::Dispatch);
        st.complete("c");

        let next = st.next_ready().unwrap();
        assert_eq!(next.identity(), "b");
        st.complete("b");

        let next = st.next_ready().unwrap();
        assert_eq!(next.identity(), "a");
        st.complete("a");

        let next = st.next_ready().unwrap();
        assert_eq!(next.identity(), "d");
        st.complete("d");

        assert!(st.next_ready().is_none());
        assert_eq!(st.deployed.sorted(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn satisfied_refire_leaves_the_queue() {
        let mut st = GateState::default();
        st.admit(&item("app", &["db"]));
        st.deployed.insert("db");

        assert_eq!(st.admit(&item("app", &["db"])), Admission::Dispatch);
        assert_eq!(st.pending.len(), 0);
    }

    #[test]
    fn abandon_releases_claim_without_queueing() {
        let mut st = GateState::default();
        st.admit(&item("x", &["y"]));
        assert_eq!(st.admit(&item("root", &[])), Admission::Dispatch);

        assert!(st.abandon("root"));
        assert!(!st.abandon("root"));
        assert!(!st.is_in_flight("root"));
        let ids: Vec<&str> = st.pending.items().iter().map(|i| i.identity()).collect();
        assert_eq!(ids, vec!["x"]);
        assert!(st.next_ready().is_none());

        assert_eq!(st.admit(&item("root", &[])), Admission::Dispatch);
    }

    #[test]
    fn undeploy_makes_identity_fresh() {
        let mut st = GateState::default();
        st.admit(&item("db", &[]));
        st.complete("db");
        assert!(st.undeploy("db"));
        assert!(!st.undeploy("db"));
        assert_eq!(st.admit(&item("db", &[])), Admission::Dispatch);
    }
}
