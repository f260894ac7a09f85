//! # Work items and the handles they carry.
//!
//! - [`WorkItem`] - identity + dependency set + context + payload
//! - [`ExecutionContext`] - opaque environment passed to listeners
//! - [`Payload`] - opaque caller data

mod context;
mod item;

pub use context::{ExecutionContext, Payload};
pub use item::WorkItem;
