//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for observing dispatcher [`Event`]s
//! (logging, metrics, audit). Subscribers are **observers**; they never influence gating.
//! Deploy/undeploy handling belongs to [`Listener`](crate::Listener).
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::SubscriberPanicked`)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use deploygate::{Event, EventKind, Subscribe};
//!
//! struct StuckDeploys;
//!
//! #[async_trait]
//! impl Subscribe for StuckDeploys {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::DeployQueued) {
//!             // export a gauge, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "stuck-deploys" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for dispatcher observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
