//! # Work item: the unit of dependency-gated work.
//!
//! A [`WorkItem`] names a deployable unit (`identity`), the identities it depends on,
//! the [`ExecutionContext`] its listeners run in and an opaque [`Payload`].
//!
//! ## Rules
//! - Equality and hashing are by identity only.
//! - Items are immutable once built; clones share their data.
//! - An item that lists itself as a dependency can never pass the gate.
//!
//! ## Example
//! ```rust
//! use deploygate::WorkItem;
//!
//! let item = WorkItem::new("billing").depends_on("db").depends_on("auth");
//! assert_eq!(item.identity(), "billing");
//! assert!(item.depends("db"));
//! assert!(!item.is_root());
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::context::{ExecutionContext, Payload};

/// Immutable deploy/undeploy unit.
#[derive(Clone)]
pub struct WorkItem {
    identity: Arc<str>,
    dependencies: Arc<BTreeSet<String>>,
    context: ExecutionContext,
    payload: Payload,
}

impl WorkItem {
    /// Creates an item with no dependencies, a default context and no payload.
    pub fn new(identity: impl Into<Arc<str>>) -> Self {
        Self {
            identity: identity.into(),
            dependencies: Arc::new(BTreeSet::new()),
            context: ExecutionContext::default(),
            payload: Payload::empty(),
        }
    }

    /// Adds one dependency.
    pub fn depends_on(mut self, identity: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.dependencies).insert(identity.into());
        self
    }

    /// Adds several dependencies.
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::make_mut(&mut self.dependencies).extend(deps.into_iter().map(Into::into));
        self
    }

    /// Sets the execution context.
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Unique identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Shared identity handle (cheap to clone into events).
    pub fn identity_arc(&self) -> Arc<str> {
        Arc::clone(&self.identity)
    }

    /// Declared dependencies, sorted.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// True if `identity` is a declared dependency.
    pub fn depends(&self, identity: &str) -> bool {
        self.dependencies.contains(identity)
    }

    /// True if the item has no dependencies.
    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Dependencies absent from `deployed`, in sorted order.
    pub fn missing(&self, deployed: &HashSet<String>) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|d| !deployed.contains(d.as_str()))
            .cloned()
            .collect()
    }

    /// True if every dependency is in `deployed`.
    pub fn is_satisfied(&self, deployed: &HashSet<String>) -> bool {
        self.dependencies.iter().all(|d| deployed.contains(d.as_str()))
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for WorkItem {}

impl Hash for WorkItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("identity", &self.identity)
            .field("dependencies", &self.dependencies)
            .field("context", &self.context.label())
            .finish()
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}
