//! # Dispatcher: dependency gate, listener delivery and cascade.
//!
//! The [`Dispatcher`] owns the gate state (deployed set, pending queue), the
//! [`ListenerRegistry`], the premature-capture buffer and the event [`Bus`].
//!
//! ## Deploy path
//! ```text
//! fire_deploy(item)
//!   ├─► capture armed? ──yes──► buffer (replayed by system_ready)       → Captured
//!   └─► admit(item)   (one lock: check + record)
//!         ├─ deployed / in flight ─────────────────────────────────────► Duplicate
//!         ├─ missing deps ──► queue once, log missing ─────────────────► Queued
//!         └─ satisfied ──► claim
//!               ├─► snapshot listeners ─► on_deploy(item, item.context) each
//!               │      (error or panic: log + ListenerFailed/Panicked, continue)
//!               ├─► complete: in flight → deployed
//!               ├─► binder.bind(identity, context, properties)
//!               └─► cascade: loop { claim first ready pending item; dispatch it }
//!                                                                       → Dispatched
//! ```
//!
//! ## Undeploy path
//! ```text
//! fire_undeploy(item) ─► snapshot listeners ─► on_undeploy each ─► deployed.remove(id)
//!                     ─► binder.unbind(identity, context)
//! ```
//!
//! ## Rules
//! - The gate lock is never held while a listener, the binder or a subscriber runs, so a
//!   listener may fire items or (un)register listeners from its own callback.
//! - A deploy is successful when it passes the gate; listener outcomes do not change that.
//! - Each dispatched item's listeners receive that item's own context, also in a cascade;
//!   there is no ambient context to save or restore.
//! - The cascade is an iterative worklist: each round rescans the queue from the front,
//!   so chains resolve in dependency order with bounded stack depth.
//! - Every gate decision ends by draining ready queued items, so nothing whose
//!   dependencies are deployed stays queued once a fire returns.
//! - An abandoned dispatch (its future dropped mid-flight) releases its claim; the identity
//!   is unseen again and the next fire admits it fresh.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::DispatcherConfig;
use crate::error::{BindError, ListenerError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::items::WorkItem;
use crate::listeners::{Listener, ListenerRef, ListenerRegistry};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::binder::ContextBinder;
use super::builder::DispatcherBuilder;
use super::capture::Capture;
use super::state::{Admission, GateState};

/// Result of [`Dispatcher::fire_deploy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Buffered until [`Dispatcher::system_ready`].
    Captured,
    /// Identity already deployed or being dispatched; nothing happened.
    Duplicate,
    /// Blocked on the listed identities (sorted).
    Queued { missing: Vec<String> },
    /// Dispatched; `cascaded` queued items were dispatched in the same call.
    Dispatched { cascaded: usize },
}

impl DeployOutcome {
    /// True for [`DeployOutcome::Dispatched`].
    pub fn is_dispatched(&self) -> bool {
        matches!(self, DeployOutcome::Dispatched { .. })
    }
}

/// Dependency-gated deploy/undeploy dispatcher.
///
/// Build one per host with [`Dispatcher::builder`] (or [`Dispatcher::new`]) and share the
/// returned `Arc` with every caller that fires events.
pub struct Dispatcher {
    cfg: DispatcherConfig,
    bus: Bus,
    listeners: Arc<ListenerRegistry>,
    state: Mutex<GateState>,
    capture: Mutex<Capture>,
    binder: Option<Arc<dyn ContextBinder>>,
    runtime_token: CancellationToken,
}

impl Dispatcher {
    /// Starts a builder.
    pub fn builder(cfg: DispatcherConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Dispatcher without subscribers or binder.
    pub fn new(cfg: DispatcherConfig) -> Arc<Self> {
        DispatcherBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(
        cfg: DispatcherConfig,
        bus: Bus,
        listeners: Arc<ListenerRegistry>,
        binder: Option<Arc<dyn ContextBinder>>,
        runtime_token: CancellationToken,
    ) -> Self {
        let capture = Capture::new(cfg.capture_premature);
        Self {
            cfg,
            bus,
            listeners,
            state: Mutex::new(GateState::default()),
            capture: Mutex::new(capture),
            binder,
            runtime_token,
        }
    }

    // ---------------------------
    // Listener registry
    // ---------------------------

    /// Appends a listener. Safe to call from inside a listener callback.
    pub fn register(&self, listener: ListenerRef) {
        debug!(listener = listener.name(), "listener registered");
        self.listeners.register(listener);
    }

    /// Removes the first registration of `listener`. Safe to call from inside a callback.
    pub fn unregister(&self, listener: &dyn Listener) -> bool {
        let removed = self.listeners.unregister(listener);
        debug!(listener = listener.name(), removed, "listener unregistered");
        removed
    }

    /// Removes every listener. Returns how many registrations were dropped.
    pub fn unregister_listeners(&self) -> usize {
        let dropped = self.listeners.len();
        self.listeners.clear();
        debug!(dropped, "all listeners unregistered");
        dropped
    }

    /// The live registry (shared handle).
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    // ---------------------------
    // Deploy / undeploy
    // ---------------------------

    /// Fires a deploy.
    ///
    /// Returns once the item and every queued item it unblocked (transitively) have been
    /// dispatched, or once it has been captured, queued or ignored.
    pub async fn fire_deploy(&self, item: WorkItem) -> DeployOutcome {
        let identity = item.identity_arc();
        let held = lock(&self.capture).hold(item);
        let Some(item) = held else {
            debug!(item = %identity, "deploy captured before system ready");
            self.bus
                .publish(Event::new(EventKind::DeployCaptured).with_item(identity));
            return DeployOutcome::Captured;
        };
        self.gate(item).await
    }

    /// Fires an undeploy. No gating: every listener is invoked, the identity leaves the
    /// deployed set and the binder releases its context. Returns true if the identity was
    /// deployed.
    pub async fn fire_undeploy(&self, item: WorkItem) -> bool {
        let listeners = self.listeners.snapshot();
        for listener in listeners.iter() {
            let res = guarded(async { listener.on_undeploy(&item, item.context()).await }).await;
            if let Err(err) = res {
                self.report_fault("undeploy", &item, listener.as_ref(), err);
            }
        }

        let was_deployed = lock(&self.state).undeploy(item.identity());
        self.unbind(&item).await;
        info!(
            item = item.identity(),
            was_deployed,
            listeners = listeners.len(),
            "undeploy dispatched"
        );
        self.bus
            .publish(Event::new(EventKind::UndeployDispatched).with_item(item.identity_arc()));
        was_deployed
    }

    /// Host initialization finished: disarms capture and replays buffered deploys in fire
    /// order. Returns the number replayed; later calls are no-ops returning 0 until the next
    /// [`reset`](Self::reset).
    pub async fn system_ready(&self) -> usize {
        let replay = lock(&self.capture).ready();
        let Some(replay) = replay else {
            debug!("system already ready; nothing to replay");
            return 0;
        };
        self.replay(replay).await
    }

    /// Turns premature capture on or off at runtime.
    ///
    /// Turning it on buffers subsequent deploys. Turning it off replays whatever is
    /// buffered, in fire order, and returns how many were replayed.
    pub async fn set_capture_premature(&self, capture: bool) -> usize {
        if capture {
            lock(&self.capture).arm();
            debug!("premature capture armed");
            return 0;
        }
        let released = lock(&self.capture).release();
        self.replay(released).await
    }

    async fn replay(&self, items: Vec<WorkItem>) -> usize {
        let count = items.len();
        info!(count, "replaying captured deploys");
        self.bus
            .publish(Event::new(EventKind::CaptureReplayed).with_reason(count.to_string()));
        for item in items {
            self.gate(item).await;
        }
        count
    }

    /// Clears the pending queue and the listener registry, discards captured deploys and
    /// re-arms premature capture. The deployed set is cleared unless the policy is
    /// [`ResetPolicy::KeepDeployed`](crate::ResetPolicy::KeepDeployed).
    pub fn reset(&self) {
        let (dropped, cleared_deployed) = {
            let mut st = lock(&self.state);
            let dropped = st.pending.len();
            st.pending.clear();
            let clear = self.cfg.reset_clears_deployed();
            if clear {
                st.deployed.clear();
            }
            (dropped, clear)
        };
        self.listeners.clear();
        lock(&self.capture).rearm();

        info!(
            dropped_pending = dropped,
            cleared_deployed, "dispatcher reset"
        );
        self.bus.publish(Event::new(EventKind::DispatcherReset));
    }

    // ---------------------------
    // Queries
    // ---------------------------

    pub fn is_deployed(&self, identity: &str) -> bool {
        lock(&self.state).deployed.contains(identity)
    }

    /// True while the identity's listeners are running.
    pub fn is_dispatching(&self, identity: &str) -> bool {
        lock(&self.state).is_in_flight(identity)
    }

    /// Deployed identities, sorted.
    pub fn deployed(&self) -> Vec<String> {
        lock(&self.state).deployed.sorted()
    }

    /// Pending identities in queue order.
    pub fn pending(&self) -> Vec<String> {
        lock(&self.state)
            .pending
            .items()
            .iter()
            .map(|i| i.identity().to_string())
            .collect()
    }

    /// Missing dependencies of a pending identity; `None` if it is not pending.
    pub fn missing_for(&self, identity: &str) -> Option<Vec<String>> {
        lock(&self.state).missing_for(identity)
    }

    /// True while deploys are being captured.
    pub fn is_capturing(&self) -> bool {
        lock(&self.capture).is_armed()
    }

    /// Number of captured deploys awaiting replay.
    pub fn captured_len(&self) -> usize {
        lock(&self.capture).len()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    /// New raw receiver on the event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stops the subscriber listener. Firing keeps working; subscribers see nothing more.
    pub fn shutdown(&self) {
        self.runtime_token.cancel();
    }

    // ---------------------------
    // Gate
    // ---------------------------

    async fn gate(&self, item: WorkItem) -> DeployOutcome {
        let admission = lock(&self.state).admit(&item);
        match admission {
            Admission::Duplicate => {
                debug!(item = item.identity(), "duplicate deploy ignored");
                self.bus
                    .publish(Event::new(EventKind::DuplicateIgnored).with_item(item.identity_arc()));
                self.cascade().await;
                DeployOutcome::Duplicate
            }
            Admission::Queued { missing, first } => {
                info!(item = item.identity(), ?missing, first, "deploy waiting on dependencies");
                self.bus.publish(
                    Event::new(EventKind::DeployQueued)
                        .with_item(item.identity_arc())
                        .with_missing(missing.clone())
                        .with_reason(if first { "queued" } else { "still_waiting" }),
                );
                self.cascade().await;
                DeployOutcome::Queued { missing }
            }
            Admission::Dispatch => {
                self.dispatch(item, false).await;
                let cascaded = self.cascade().await;
                DeployOutcome::Dispatched { cascaded }
            }
        }
    }

    /// Dispatches queued items until none is ready.
    async fn cascade(&self) -> usize {
        let mut cascaded = 0;
        loop {
            let next = lock(&self.state).next_ready();
            let Some(item) = next else { break };
            self.dispatch(item, true).await;
            cascaded += 1;
        }
        if cascaded > 0 {
            debug!(cascaded, "cascade settled");
        }
        cascaded
    }

    /// Runs listeners for an item whose in-flight claim the caller holds.
    async fn dispatch(&self, item: WorkItem, cascade: bool) {
        let claim = Claim::new(&self.state, item.identity_arc());

        let listeners = self.listeners.snapshot();
        for listener in listeners.iter() {
            let res = guarded(async { listener.on_deploy(&item, item.context()).await }).await;
            if let Err(err) = res {
                self.report_fault("deploy", &item, listener.as_ref(), err);
            }
        }
        claim.commit();

        info!(
            item = item.identity(),
            context = item.context().label(),
            cascade,
            listeners = listeners.len(),
            "deploy dispatched"
        );
        self.bus.publish(
            Event::new(EventKind::DeployDispatched)
                .with_item(item.identity_arc())
                .with_cascade(cascade),
        );

        self.bind(&item).await;
    }

    async fn bind(&self, item: &WorkItem) {
        let Some(binder) = &self.binder else { return };
        let fut = async {
            binder
                .bind(item.identity(), item.context(), &self.cfg.binding_properties)
                .await
        };
        self.settle_binding("bind", item, fut).await;
    }

    async fn unbind(&self, item: &WorkItem) {
        let Some(binder) = &self.binder else { return };
        let fut = async { binder.unbind(item.identity(), item.context()).await };
        self.settle_binding("unbind", item, fut).await;
    }

    /// Awaits a binder call, reporting errors and panics as `BindFailed`.
    async fn settle_binding<F>(&self, op: &'static str, item: &WorkItem, fut: F)
    where
        F: Future<Output = Result<(), BindError>>,
    {
        let res = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(BindError::Failed {
                identity: item.identity().to_string(),
                error: format!("panic: {}", panic_info(&*panic)),
            }),
        };

        if let Err(err) = res {
            error!(item = item.identity(), op, error = %err, "context binding failed");
            self.bus.publish(
                Event::new(EventKind::BindFailed)
                    .with_item(item.identity_arc())
                    .with_reason(err.as_message()),
            );
        }
    }

    fn report_fault(&self, op: &'static str, item: &WorkItem, listener: &dyn Listener, err: ListenerError) {
        error!(
            item = item.identity(),
            listener = listener.name(),
            op,
            label = err.as_label(),
            error = %err,
            "listener fault"
        );
        let kind = if err.is_panic() {
            EventKind::ListenerPanicked
        } else {
            EventKind::ListenerFailed
        };
        self.bus.publish(
            Event::new(kind)
                .with_item(item.identity_arc())
                .with_listener(listener.name())
                .with_reason(err.as_message()),
        );
    }

    /// Forwards bus events to `subs` until shutdown.
    pub(crate) fn spawn_subscriber_listener(&self, subs: Vec<Arc<dyn Subscribe>>) {
        let set = SubscriberSet::new(subs, self.bus.clone());
        let mut rx = self.bus.subscribe();
        let token = self.runtime_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged, events dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            set.shutdown().await;
        });
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}

/// In-flight claim on one identity; released unless committed.
struct Claim<'a> {
    state: &'a Mutex<GateState>,
    identity: Arc<str>,
    committed: bool,
}

impl<'a> Claim<'a> {
    fn new(state: &'a Mutex<GateState>, identity: Arc<str>) -> Self {
        Self {
            state,
            identity,
            committed: false,
        }
    }

    fn commit(mut self) {
        lock(self.state).complete(&self.identity);
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            warn!(item = %self.identity, "deploy dispatch abandoned, claim released");
            lock(self.state).abandon(&self.identity);
        }
    }
}

/// Runs a listener future, turning a panic into [`ListenerError::Panicked`].
async fn guarded<F>(fut: F) -> Result<(), ListenerError>
where
    F: Future<Output = Result<(), ListenerError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(ListenerError::Panicked {
            info: panic_info(&*panic),
        }),
    }
}

/// Locks ignoring poison: every critical section leaves the state consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
