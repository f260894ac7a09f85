//! # Events emitted by the dispatcher.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Gate events**: queueing, dispatch, duplicates, undeploy
//! - **Fault events**: listener and binder failures
//! - **Capture events**: premature capture and replay, reset
//! - **Subscriber events**: overflow and panics inside observability subscribers
//!
//! The [`Event`] struct carries metadata such as the item identity, listener name,
//! missing dependencies and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use deploygate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DeployQueued)
//!     .with_item("billing")
//!     .with_missing(vec!["db".to_string()]);
//!
//! assert_eq!(ev.kind, EventKind::DeployQueued);
//! assert_eq!(ev.item.as_deref(), Some("billing"));
//! assert_eq!(ev.missing_ids(), ["db".to_string()]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatcher events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Gate events ===
    /// Deploy blocked on unmet dependencies (first time or repeated diagnostic).
    ///
    /// Sets:
    /// - `item`: identity
    /// - `missing`: identities not yet deployed
    /// - `reason`: `"queued"` on first enqueue, `"still_waiting"` afterwards
    DeployQueued,

    /// Deploy passed the gate and all listeners were invoked.
    ///
    /// Sets:
    /// - `item`: identity
    /// - `cascade`: true when dispatched while draining the pending queue
    DeployDispatched,

    /// Deploy for an identity that is already deployed or being dispatched.
    ///
    /// Sets:
    /// - `item`: identity
    DuplicateIgnored,

    /// Undeploy delivered to all listeners; identity removed from the deployed set.
    ///
    /// Sets:
    /// - `item`: identity
    UndeployDispatched,

    // === Fault events ===
    /// A listener returned an error.
    ///
    /// Sets:
    /// - `item`: identity
    /// - `listener`: listener name
    /// - `reason`: error message
    ListenerFailed,

    /// A listener panicked; the panic was caught.
    ///
    /// Sets:
    /// - `item`: identity
    /// - `listener`: listener name
    /// - `reason`: panic payload
    ListenerPanicked,

    /// The context binder failed after a successful deploy.
    ///
    /// Sets:
    /// - `item`: identity
    /// - `reason`: error message
    BindFailed,

    // === Capture events ===
    /// Deploy fired before the host was ready; buffered for replay.
    ///
    /// Sets:
    /// - `item`: identity
    DeployCaptured,

    /// Host became ready; buffered deploys are being replayed.
    ///
    /// Sets:
    /// - `reason`: number of replayed items
    CaptureReplayed,

    /// Dispatcher was reset.
    DispatcherReset,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `listener`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `listener`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,
}

/// Dispatcher event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Work item identity, if applicable.
    pub item: Option<Arc<str>>,
    /// Listener or subscriber name, if applicable.
    pub listener: Option<Arc<str>>,
    /// Dependencies not yet satisfied (sorted).
    pub missing: Option<Arc<[String]>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// True when a deploy was dispatched by a cascade rather than by its own fire.
    pub cascade: bool,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            item: None,
            listener: None,
            missing: None,
            reason: None,
            cascade: false,
        }
    }

    /// Attaches a work item identity.
    #[inline]
    pub fn with_item(mut self, item: impl Into<Arc<str>>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Attaches a listener or subscriber name.
    #[inline]
    pub fn with_listener(mut self, listener: impl Into<Arc<str>>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Attaches the missing dependency identities.
    #[inline]
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = Some(missing.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Marks a dispatch as cascade-driven.
    #[inline]
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// Missing identities, or an empty slice.
    pub fn missing_ids(&self) -> &[String] {
        self.missing.as_deref().unwrap_or(&[])
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_listener(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_listener(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for listener and binder faults.
    #[inline]
    pub fn is_fault(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ListenerFailed | EventKind::ListenerPanicked | EventKind::BindFailed
        )
    }
}
