//! Dispatcher events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish/subscribe
//! to events emitted by the dispatcher, the premature-capture gate and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (queue/dispatch/undeploy/faults/capture/reset),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the dispatcher's subscriber listener (fans out to `SubscriberSet`)
//!   and any raw receiver from `Dispatcher::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
