//! # deploygate
//!
//! **Deploygate** is a dependency-gated deployment event dispatcher.
//!
//! Modules (plugins, services, components) announce themselves by firing a deploy for a
//! [`WorkItem`]: an identity plus the identities it depends on. The [`Dispatcher`] holds
//! each item until every dependency has been deployed, then notifies all registered
//! [`Listener`]s, and finally cascades to whatever queued items that deployment unblocked.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   WorkItem   │   │   WorkItem   │   │   WorkItem   │
//!     │  (db, [])    │   │ (auth, [db]) │   │ (app, [auth])│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ fire_deploy      ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - Capture      (buffers deploys until system_ready)              │
//! │  - GateState    (deployed set, in-flight claims, pending queue)   │
//! │  - ListenerRegistry (copy-on-write, snapshot per dispatch)        │
//! │  - ContextBinder    (bind after deploy, unbind on undeploy)       │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼ on_deploy / on_undeploy                          │ publish
//!     ┌──────────────┐   ┌──────────────┐                   ▼
//!     │  Listener 1  │──►│  Listener 2  │──► ...   ┌───────────────────┐
//!     └──────────────┘   └──────────────┘          │ Bus (broadcast)   │
//!                                                  └─────────┬─────────┘
//!                                                            ▼
//!                                                  ┌───────────────────┐
//!                                                  │ subscriber        │
//!                                                  │ listener task     │
//!                                                  └─────────┬─────────┘
//!                                                            ▼
//!                                                      SubscriberSet
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                               worker1   worker2   workerN
//! ```
//!
//! ### Deploy lifecycle
//! ```text
//! fire_deploy(item)
//!   ├─► captured (before system_ready)       ─► replayed later, in order
//!   ├─► already deployed / dispatching       ─► DuplicateIgnored
//!   ├─► dependencies missing                 ─► queued once, DeployQueued{missing}
//!   └─► dependencies satisfied
//!         ├─► every listener: on_deploy(item, item.context)
//!         │     (errors and panics isolated per listener)
//!         ├─► identity marked deployed       ─► DeployDispatched
//!         ├─► binder.bind(identity, context, properties)
//!         └─► cascade over the pending queue until nothing is ready
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                           |
//! |-------------------|----------------------------------------------------------------|----------------------------------------------|
//! | **Dispatch**      | Gate, cascade, undeploy, premature capture, reset.             | [`Dispatcher`], [`DeployOutcome`]            |
//! | **Listeners**     | Receive deploy/undeploy notifications.                         | [`Listener`], [`ListenerFn`], [`ListenerRef`]|
//! | **Work items**    | Identity, dependencies, execution context and payload.         | [`WorkItem`], [`ExecutionContext`]           |
//! | **Subscriber API**| Observe dispatcher events (logging, metrics, audit).           | [`Subscribe`], [`Event`]                     |
//! | **Errors**        | Typed listener and binder errors.                              | [`ListenerError`], [`BindError`]             |
//! | **Configuration** | Capture, reset policy, bus capacity, binding properties.       | [`DispatcherConfig`], [`ResetPolicy`]        |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that renders events through
//!   `tracing`.
//!
//! ## Example
//! ```rust
//! use deploygate::{
//!     DeployOutcome, Dispatcher, DispatcherConfig, ListenerError, ListenerFn, ListenerRef, WorkItem,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let printer: ListenerRef = ListenerFn::arc_deploy_only("printer", |item, _cx| async move {
//!         println!("deployed {}", item.identity());
//!         Ok::<_, ListenerError>(())
//!     });
//!     let dispatcher = Dispatcher::builder(DispatcherConfig::default())
//!         .with_listeners(vec![printer])
//!         .build();
//!
//!     // Captured until the host says it is ready.
//!     let out = dispatcher.fire_deploy(WorkItem::new("app").depends_on("db")).await;
//!     assert_eq!(out, DeployOutcome::Captured);
//!     dispatcher.system_ready().await;
//!     assert_eq!(dispatcher.pending(), vec!["app"]);
//!
//!     // Deploying `db` cascades to `app`.
//!     let out = dispatcher.fire_deploy(WorkItem::new("db")).await;
//!     assert_eq!(out, DeployOutcome::Dispatched { cascaded: 1 });
//!     assert_eq!(dispatcher.deployed(), vec!["app", "db"]);
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod items;
mod listeners;
mod subscribers;

// ---- Public re-exports ----

pub use config::{DispatcherConfig, ResetPolicy};
pub use core::{ContextBinder, DeployOutcome, Dispatcher, DispatcherBuilder};
pub use error::{BindError, ListenerError};
pub use events::{Bus, Event, EventKind};
pub use items::{ExecutionContext, Payload, WorkItem};
pub use listeners::{Listener, ListenerFn, ListenerRef, ListenerRegistry, NoopFn, Snapshot};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
