//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`] centralized settings for the dispatcher runtime and
//! [`ResetPolicy`] which decides what [`Dispatcher::reset`](crate::Dispatcher::reset) forgets.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`DispatcherConfig::bus_capacity_clamped`]

use std::collections::BTreeMap;

/// What happens to the deployed set on [`Dispatcher::reset`](crate::Dispatcher::reset).
///
/// Pending items, listeners and the capture buffer are always cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Deployed identities are forgotten; re-firing them dispatches again (default).
    #[default]
    ClearDeployed,
    /// Deployed identities survive a reset, for hosts that reset listeners but keep
    /// their modules running.
    KeepDeployed,
}

/// Global configuration for the dispatcher.
///
/// ## Field semantics
/// - `capture_premature`: start with premature-event capture armed (initial state only)
/// - `reset_policy`: whether reset also clears the deployed set
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `binding_properties`: properties bag passed to the context binder
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Buffer deploys until [`Dispatcher::system_ready`](crate::Dispatcher::system_ready) is called.
    ///
    /// With `false` the dispatcher is ready from construction and every deploy is
    /// gated immediately. This is only the initial state:
    /// [`Dispatcher::reset`](crate::Dispatcher::reset) always re-arms capture.
    pub capture_premature: bool,

    /// Deployed-set handling on reset.
    pub reset_policy: ResetPolicy,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,

    /// Opaque properties handed to the context binder on every new deploy.
    pub binding_properties: BTreeMap<String, String>,
}

impl DispatcherConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns true if reset should also forget deployed identities.
    #[inline]
    pub fn reset_clears_deployed(&self) -> bool {
        self.reset_policy == ResetPolicy::ClearDeployed
    }

    /// Adds one binding property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.binding_properties.insert(key.into(), value.into());
        self
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `capture_premature = true`
    /// - `reset_policy = ResetPolicy::ClearDeployed`
    /// - `bus_capacity = 1024`
    /// - `binding_properties = {}`
    fn default() -> Self {
        Self {
            capture_premature: true,
            reset_policy: ResetPolicy::default(),
            bus_capacity: 1024,
            binding_properties: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DispatcherConfig::default();
        assert!(cfg.capture_premature);
        assert!(cfg.reset_clears_deployed());
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
        assert!(cfg.binding_properties.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = DispatcherConfig {
            bus_capacity: 0,
            ..DispatcherConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn with_property_accumulates() {
        let cfg = DispatcherConfig::default()
            .with_property("policy", "strict")
            .with_property("codebase", "/srv/app");
        assert_eq!(cfg.binding_properties.len(), 2);
        assert_eq!(cfg.binding_properties["policy"], "strict");
    }
}
