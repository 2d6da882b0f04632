//! Signal routing
//!
//! Fans each decoded telemetry value out to the subscribers registered for
//! that exact signal name. The router is an explicit registry object: the
//! surrounding application keeps ownership of its sinks through `Rc` and
//! registers shared handles here.

use crate::types::TelemetryPacket;
use std::cell::RefCell;
use std::rc::Rc;

/// A consumer of routed signal values
///
/// Values are delivered as-is; clamping or ignoring out-of-range values is
/// the sink's own policy, not the router's.
pub trait SignalSink {
    /// Deliver one value for the signal `name`
    fn update(&mut self, value: f64, name: &str);
}

/// Handle returned by `register`, used to unregister later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Registration {
    id: SubscriberId,
    filter: String,
    sink: Rc<RefCell<dyn SignalSink>>,
}

/// Registry of subscribers plus per-packet dispatch
///
/// Dispatch matches on exact signal name. A snapshot of the registration
/// list is taken at the start of each dispatch cycle, so a sink that
/// registers or unregisters subscribers mid-cycle cannot corrupt the
/// iteration; such changes take effect from the next packet on.
#[derive(Default)]
pub struct SignalRouter {
    subscribers: RefCell<Vec<Registration>>,
    next_id: RefCell<u64>,
}

impl SignalRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink for one exact signal name
    pub fn register(&self, filter: impl Into<String>, sink: Rc<RefCell<dyn SignalSink>>) -> SubscriberId {
        let mut next_id = self.next_id.borrow_mut();
        let id = SubscriberId(*next_id);
        *next_id += 1;

        self.subscribers.borrow_mut().push(Registration {
            id,
            filter: filter.into(),
            sink,
        });
        id
    }

    /// Remove a subscriber; returns false if the id was not registered
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|reg| reg.id != id);
        subs.len() != before
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver every entry of one packet to all matching subscribers
    ///
    /// The whole packet is dispatched before this returns; the caller does
    /// not parse the next packet until then, so consumers always see the
    /// most recent value even when updates outpace them.
    pub fn dispatch(&self, packet: &TelemetryPacket) {
        // Stable snapshot for this cycle
        let snapshot: Vec<(String, Rc<RefCell<dyn SignalSink>>)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|reg| (reg.filter.clone(), Rc::clone(&reg.sink)))
            .collect();

        for (name, value) in &packet.entries {
            for (filter, sink) in &snapshot {
                if filter == name {
                    sink.borrow_mut().update(*value, name);
                }
            }
        }
    }
}
