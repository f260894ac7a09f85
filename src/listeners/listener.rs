//! # Listener abstraction.
//!
//! A [`Listener`] is notified when a [`WorkItem`] is deployed (after passing the
//! dependency gate) or undeployed. The dispatcher guarantees ordering, gating and
//! delivery; what a listener does with the event is its own business.
//!
//! The common handle type is [`ListenerRef`], an `Arc<dyn Listener>`.
//!
//! ## Rules
//! - Listeners run in registration order, one after another, on the firing caller's task.
//! - Errors and panics are caught per listener; siblings still run and the item is still
//!   marked deployed.
//! - A listener may register/unregister listeners or fire other items from inside its
//!   callback.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::items::{ExecutionContext, WorkItem};

/// Shared listener handle.
pub type ListenerRef = Arc<dyn Listener>;

/// # Deploy/undeploy event listener.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use deploygate::{ExecutionContext, Listener, ListenerError, WorkItem};
///
/// struct Router;
///
/// #[async_trait]
/// impl Listener for Router {
///     fn name(&self) -> &str { "router" }
///
///     async fn on_deploy(&self, item: &WorkItem, _cx: &ExecutionContext) -> Result<(), ListenerError> {
///         // mount routes for `item`...
///         let _ = item.identity();
///         Ok(())
///     }
///
///     async fn on_undeploy(&self, _item: &WorkItem, _cx: &ExecutionContext) -> Result<(), ListenerError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Name used in logs and fault events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once per identity when its dependencies are satisfied.
    ///
    /// `cx` is the item's own execution context, also when dispatched by a cascade.
    async fn on_deploy(&self, item: &WorkItem, cx: &ExecutionContext) -> Result<(), ListenerError>;

    /// Called on every undeploy, whether or not the identity was deployed.
    async fn on_undeploy(&self, item: &WorkItem, cx: &ExecutionContext)
    -> Result<(), ListenerError>;
}
