//! Error types used by the dispatcher and its collaborators.
//!
//! This module defines two enums:
//!
//! - [`ListenerError`] faults raised by a listener while handling a deploy/undeploy.
//! - [`BindError`] faults raised by the context binder after a successful deploy.
//!
//! Neither is ever propagated out of the dispatcher. Both are logged and published on the
//! event bus, and both provide `as_label` / `as_message` helpers for logs and metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by listeners.
///
/// A listener fault is isolated: siblings still run and the item is still marked deployed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Listener failed while handling the event.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Listener declined to handle the event.
    #[error("listener rejected event: {reason}")]
    Rejected {
        /// Why the listener refused.
        reason: String,
    },

    /// Listener panicked; produced by the dispatcher when it catches the unwind.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        ListenerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use deploygate::ListenerError;
    ///
    /// let err = ListenerError::failed("boom");
    /// assert_eq!(err.as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Rejected { .. } => "listener_rejected",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Failed { error } => format!("error: {error}"),
            ListenerError::Rejected { reason } => format!("rejected: {reason}"),
            ListenerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True if the fault came from an unwind rather than a returned error.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

impl From<anyhow::Error> for ListenerError {
    fn from(err: anyhow::Error) -> Self {
        ListenerError::Failed {
            error: format!("{err:#}"),
        }
    }
}

/// # Errors produced by the context binder.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BindError {
    /// Binding the execution context for a freshly deployed identity failed.
    #[error("binding '{identity}' failed: {error}")]
    Failed {
        /// Identity whose binding failed.
        identity: String,
        /// The underlying error message.
        error: String,
    },
}

impl BindError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BindError::Failed { .. } => "bind_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BindError::Failed { identity, error } => format!("identity={identity} error: {error}"),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
