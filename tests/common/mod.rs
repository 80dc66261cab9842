//! Shared fixtures for failover integration tests.

#![allow(dead_code)]

pub mod mock_transport;

use std::sync::Arc;

use parking_lot::Mutex;

use relayswitch::channel::ChannelRegistry;
use relayswitch::config::Config;
use relayswitch::events::{ChannelEvent, EventSink, Notifier};
use relayswitch::guard::TransitionGuard;
use relayswitch::probe::ProbeTransport;
use relayswitch::selector::FailoverSelector;

use self::mock_transport::MockTransport;

/// Records every emitted event for assertions.
#[derive(Default)]
pub struct EventCollector {
    events: Mutex<Vec<ChannelEvent>>,
}

impl EventCollector {
    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn contains(&self, event: &ChannelEvent) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    pub fn count(&self, event: &ChannelEvent) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

impl EventSink for EventCollector {
    fn notify(&self, event: &ChannelEvent) {
        self.events.lock().push(event.clone());
    }
}

/// The fully wired component graph over the default six-channel fixture,
/// with a scripted transport and an event collector attached.
pub struct Harness {
    pub registry: Arc<ChannelRegistry>,
    pub notifier: Arc<Notifier>,
    pub selector: Arc<FailoverSelector>,
    pub guard: Arc<TransitionGuard>,
    pub transport: Arc<MockTransport>,
    pub events: Arc<EventCollector>,
}

pub fn harness() -> Harness {
    let transport = Arc::new(MockTransport::new());
    let registry = Arc::new(ChannelRegistry::new(Config::default().channel_set()));
    let notifier = Arc::new(Notifier::new());
    let events = Arc::new(EventCollector::default());
    let events_sink: Arc<dyn EventSink> = events.clone();
    notifier.subscribe(events_sink);

    let selector_transport: Arc<dyn ProbeTransport> = transport.clone();
    let selector = Arc::new(FailoverSelector::new(
        Arc::clone(&registry),
        Arc::clone(&notifier),
        selector_transport,
    ));
    let guard = Arc::new(TransitionGuard::new(
        Arc::clone(&registry),
        Arc::clone(&notifier),
        Arc::clone(&selector),
    ));

    Harness {
        registry,
        notifier,
        selector,
        guard,
        transport,
        events,
    }
}

/// Count of connected channels; the registry invariant is that this is 0 or 1.
pub fn connected_count(registry: &ChannelRegistry) -> usize {
    registry
        .snapshot()
        .iter()
        .filter(|c| c.status == relayswitch::channel::ChannelStatus::Connected)
        .count()
}
