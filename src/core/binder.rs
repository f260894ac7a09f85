//! # Context binder hook.
//!
//! After a **new** identity passes the gate and its listeners have run, the dispatcher hands
//! the identity, its [`ExecutionContext`] and the configured properties bag to an optional
//! [`ContextBinder`] (for example to attach a security policy to the module's sandbox).
//!
//! On every undeploy the dispatcher calls [`ContextBinder::unbind`] so the binding is
//! released together with the module.
//!
//! ## Rules
//! - `bind` is called once per successful dispatch; never for duplicates or queued items.
//! - `unbind` is called on every undeploy, after the listeners, whether or not the identity
//!   was deployed.
//! - Fire-and-forget: errors and panics are logged and published as `BindFailed`, never
//!   propagated, and do not undo the deploy or the undeploy.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::BindError;
use crate::items::ExecutionContext;

/// Binds an execution context after a successful deploy.
#[async_trait]
pub trait ContextBinder: Send + Sync + 'static {
    async fn bind(
        &self,
        identity: &str,
        cx: &ExecutionContext,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), BindError>;

    /// Releases whatever `bind` attached to the context. Default: nothing to release.
    async fn unbind(&self, _identity: &str, _cx: &ExecutionContext) -> Result<(), BindError> {
        Ok(())
    }
}
