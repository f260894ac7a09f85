//! # Premature-event capture.
//!
//! Deploys fired before the host finished its own initialization are buffered here and
//! replayed, in fire order, when the host calls
//! [`Dispatcher::system_ready`](crate::Dispatcher::system_ready) or turns capture off with
//! [`Dispatcher::set_capture_premature`](crate::Dispatcher::set_capture_premature).
//!
//! ```text
//! fire_deploy(A) ─► armed? ─yes─► buffer [A]
//! fire_deploy(B) ─► armed? ─yes─► buffer [A, B]
//! system_ready() ─► disarm, take [A, B] ─► gate(A), gate(B)
//! fire_deploy(C) ─► armed? ─no──► gate(C)
//! ```
//!
//! ## Rules
//! - Arm/disarm and buffering are atomic with respect to each other.
//! - Turning capture off always hands out the buffer; nothing stays buffered while disarmed.
//! - `ready` fires once per reset; later calls return nothing.
//! - `rearm` discards anything still buffered and forgets that the host was ready.

use crate::items::WorkItem;

#[derive(Debug)]
pub(crate) struct Capture {
    armed: bool,
    ready: bool,
    buffer: Vec<WorkItem>,
}

impl Capture {
    pub(crate) fn new(armed: bool) -> Self {
        Self {
            armed,
            ready: false,
            buffer: Vec::new(),
        }
    }

    /// Buffers `item` while armed; otherwise hands it back for immediate gating.
    pub(crate) fn hold(&mut self, item: WorkItem) -> Option<WorkItem> {
        if self.armed {
            self.buffer.push(item);
            None
        } else {
            Some(item)
        }
    }

    /// Starts buffering again (runtime toggle); the buffer is kept.
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    /// Disarms and returns the buffered items in fire order.
    pub(crate) fn release(&mut self) -> Vec<WorkItem> {
        self.armed = false;
        std::mem::take(&mut self.buffer)
    }

    /// One-shot host-ready transition: disarms and returns the buffer.
    ///
    /// Returns `None` if the host was already reported ready since the last reset.
    pub(crate) fn ready(&mut self) -> Option<Vec<WorkItem>> {
        if self.ready {
            return None;
        }
        self.ready = true;
        Some(self.release())
    }

    /// Back to the initial armed state, dropping the buffer.
    pub(crate) fn rearm(&mut self) {
        self.armed = true;
        self.ready = false;
        self.buffer.clear();
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[WorkItem]) -> Vec<&str> {
        items.iter().map(|i| i.identity()).collect()
    }

    #[test]
    fn buffers_while_armed_and_replays_in_order() {
        let mut cap = Capture::new(true);
        assert!(cap.hold(WorkItem::new("a")).is_none());
        assert!(cap.hold(WorkItem::new("b")).is_none());
        assert_eq!(cap.len(), 2);

        let replay = cap.ready().unwrap();
        assert_eq!(ids(&replay), vec!["a", "b"]);
        assert!(!cap.is_armed());
        assert_eq!(cap.len(), 0);
    }

    #[test]
    fn ready_is_one_shot() {
        let mut cap = Capture::new(true);
        assert_eq!(cap.ready().map(|v| v.len()), Some(0));
        assert!(cap.ready().is_none());
        assert!(cap.hold(WorkItem::new("late")).is_some());
    }

    #[test]
    fn starts_disarmed_when_configured() {
        let mut cap = Capture::new(false);
        assert!(cap.hold(WorkItem::new("x")).is_some());
        assert_eq!(cap.ready().map(|v| v.len()), Some(0));
    }

    #[test]
    fn runtime_toggle_keeps_buffer_until_release() {
        let mut cap = Capture::new(false);
        cap.arm();
        assert!(cap.hold(WorkItem::new("a")).is_none());
        cap.arm();
        assert_eq!(cap.len(), 1);

        assert_eq!(ids(&cap.release()), vec!["a"]);
        assert!(!cap.is_armed());
        assert!(cap.release().is_empty());
    }

    #[test]
    fn rearm_drops_buffer_and_ready_flag() {
        let mut cap = Capture::new(true);
        cap.hold(WorkItem::new("a"));
        cap.ready();
        cap.arm();
        cap.hold(WorkItem::new("b"));

        cap.rearm();
        assert_eq!(cap.len(), 0);
        assert!(cap.is_armed());
        assert!(cap.ready().is_some());
    }
}
