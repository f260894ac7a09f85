//! Dispatcher core: gate, cascade, capture and construction.
//!
//! The public API from this module is [`Dispatcher`] (built through [`DispatcherBuilder`]),
//! its [`DeployOutcome`] and the optional [`ContextBinder`] hook.
//!
//! Internal modules:
//! - [`state`]: deployed set, in-flight claims and the pending queue;
//! - [`capture`]: buffers deploys fired before the host is ready;
//! - [`dispatcher`]: gate decisions, listener delivery, cascade and undeploy;
//! - [`builder`]: wires bus, registry, binder and subscriber listener together;
//! - [`binder`]: post-deploy context binding hook.

mod binder;
mod builder;
mod capture;
mod dispatcher;
mod state;

pub use binder::ContextBinder;
pub use builder::DispatcherBuilder;
pub use dispatcher::{DeployOutcome, Dispatcher};
