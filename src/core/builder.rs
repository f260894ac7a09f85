use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{binder::ContextBinder, dispatcher::Dispatcher};
use crate::{
    config::DispatcherConfig,
    events::Bus,
    listeners::{ListenerRef, ListenerRegistry},
    subscribers::Subscribe,
};

/// Builder for constructing a Dispatcher with optional features.
pub struct DispatcherBuilder {
    cfg: DispatcherConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    listeners: Vec<ListenerRef>,
    binder: Option<Arc<dyn ContextBinder>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            listeners: Vec::new(),
            binder: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive dispatcher events (queueing, dispatch, faults, etc.)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Pre-registers listeners, in order.
    pub fn with_listeners(mut self, listeners: Vec<ListenerRef>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Sets the hook invoked after each new identity is deployed.
    pub fn with_binder(mut self, binder: Arc<dyn ContextBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Builds and returns the Dispatcher instance.
    ///
    /// Spawns the subscriber listener when subscribers are configured, which requires a
    /// Tokio runtime; without subscribers no task is spawned.
    pub fn build(self) -> Arc<Dispatcher> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let runtime_token = CancellationToken::new();
        let registry = Arc::new(ListenerRegistry::with_listeners(self.listeners));

        let dispatcher = Arc::new(Dispatcher::new_internal(
            self.cfg,
            bus,
            registry,
            self.binder,
            runtime_token,
        ));

        if !self.subscribers.is_empty() {
            dispatcher.spawn_subscriber_listener(self.subscribers);
        }
        dispatcher
    }
}
