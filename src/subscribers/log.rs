//! # LogWriter: event renderer over `tracing`
//!
//! A minimal subscriber that renders dispatcher [`Event`]s as `tracing` records.
//! The dispatcher already logs its own decisions; this writer is for hosts that want a
//! single ordered stream of bus events (e.g. an audit log target).
//!
//! ## Example output
//! ```text
//! [queued] item="billing" missing=["db"] reason="queued"
//! [dispatched] item="db" cascade=false
//! [dispatched] item="billing" cascade=true
//! [listener-failed] item="db" listener="audit" err="disk full"
//! [undeployed] item="billing"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let item = e.item.as_deref().unwrap_or("-");
        let listener = e.listener.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::DeployQueued => {
                tracing::info!(target: "deploygate::events", "[queued] item={item:?} missing={:?} reason={reason:?}", e.missing_ids());
            }
            EventKind::DeployDispatched => {
                tracing::info!(target: "deploygate::events", "[dispatched] item={item:?} cascade={}", e.cascade);
            }
            EventKind::DuplicateIgnored => {
                tracing::debug!(target: "deploygate::events", "[duplicate] item={item:?}");
            }
            EventKind::UndeployDispatched => {
                tracing::info!(target: "deploygate::events", "[undeployed] item={item:?}");
            }
            EventKind::ListenerFailed => {
                tracing::error!(target: "deploygate::events", "[listener-failed] item={item:?} listener={listener:?} err={reason:?}");
            }
            EventKind::ListenerPanicked => {
                tracing::error!(target: "deploygate::events", "[listener-panicked] item={item:?} listener={listener:?} info={reason:?}");
            }
            EventKind::BindFailed => {
                tracing::error!(target: "deploygate::events", "[bind-failed] item={item:?} err={reason:?}");
            }
            EventKind::DeployCaptured => {
                tracing::debug!(target: "deploygate::events", "[captured] item={item:?}");
            }
            EventKind::CaptureReplayed => {
                tracing::info!(target: "deploygate::events", "[replayed] count={reason}");
            }
            EventKind::DispatcherReset => {
                tracing::info!(target: "deploygate::events", "[reset]");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "deploygate::events", "[subscriber-overflow] subscriber={listener:?} reason={reason:?}");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "deploygate::events", "[subscriber-panicked] subscriber={listener:?} info={reason:?}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
