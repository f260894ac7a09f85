//! # Opaque handles carried by a work item.
//!
//! [`ExecutionContext`] is the environment a deploy must run in (a sandbox, a resource
//! scope, a loader). The dispatcher never inspects it; it passes the item's context to
//! every listener invocation explicitly instead of installing it as ambient state.
//!
//! [`Payload`] is arbitrary caller data attached to the item.
//!
//! Both are cheap to clone (`Arc` inside) and can be downcast by listeners that know the
//! concrete type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Handle = Arc<dyn Any + Send + Sync>;

/// Execution context handed to listeners alongside the item.
#[derive(Clone)]
pub struct ExecutionContext {
    label: Arc<str>,
    handle: Option<Handle>,
}

impl ExecutionContext {
    /// Context with a label and a typed handle.
    pub fn new<T: Any + Send + Sync>(label: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            label: label.into(),
            handle: Some(Arc::new(value)),
        }
    }

    /// Context with a label only.
    pub fn named(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            handle: None,
        }
    }

    /// The label used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Borrows the handle as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.as_deref().and_then(|h| h.downcast_ref::<T>())
    }

    /// True when no handle is attached.
    pub fn is_detached(&self) -> bool {
        self.handle.is_none()
    }
}

impl Default for ExecutionContext {
    /// A detached context labelled `"default"`.
    fn default() -> Self {
        Self::named("default")
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("label", &self.label)
            .field("detached", &self.handle.is_none())
            .finish()
    }
}

/// Arbitrary data attached to a work item.
#[derive(Clone, Default)]
pub struct Payload(Option<Handle>);

impl Payload {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// Empty payload.
    pub fn empty() -> Self {
        Self(None)
    }

    /// Borrows the payload as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|h| h.downcast_ref::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() {
            "Payload(..)"
        } else {
            "Payload(empty)"
        })
    }
}
