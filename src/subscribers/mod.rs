//! # Event subscribers for the dispatcher.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and an
//! optional built-in [`LogWriter`] for observing events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Dispatcher ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                    │
//!                                                    ┌───────────────┼──────────┐
//!                                                    ▼               ▼          ▼
//!                                                LogWriter        Metrics     Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
