//! # Listeners and the registry that holds them.
//!
//! - [`Listener`] - trait notified of deploys and undeploys
//! - [`ListenerFn`] - closure-backed listener
//! - [`ListenerRef`] - shared handle (`Arc<dyn Listener>`)
//! - [`ListenerRegistry`] - copy-on-write ordered collection

mod listener;
mod listener_fn;
mod registry;

pub use listener::{Listener, ListenerRef};
pub use listener_fn::{ListenerFn, NoopFn};
pub use registry::{ListenerRegistry, Snapshot};
