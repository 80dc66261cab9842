//! Domain events and the subscription interface.
//!
//! Events are explicit and typed: one enum case per event kind, dispatched
//! synchronously to every registered sink in registration order.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::channel::ChannelStatus;

/// Events published by the registry guard and the failover selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Any direct status mutation.
    StatusChanged { id: String, status: ChannelStatus },
    /// A channel's status moved away from unavailable.
    BecameAvailable { id: String },
    /// Every channel is simultaneously unavailable.
    AllUnavailable,
    /// The elected active channel changed identity.
    Switched { id: String },
}

/// A subscriber to channel events.
///
/// Delivery is fire-and-forget and synchronous; sinks must not mutate the
/// payload and must not call back into the selector or guard.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &ChannelEvent);
}

/// Dispatches events to registered sinks.
pub struct Notifier {
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }

    pub fn emit(&self, event: ChannelEvent) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            sink.notify(&event);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
