//! Scripted probe transport for deterministic failover tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use relayswitch::probe::{
    FeedMessage, MessageFuture, MessageSource, ProbeError, ProbeFuture, ProbeTransport,
};

#[derive(Clone, Copy)]
enum Script {
    Latency(u64),
    Fail,
}

/// Probe transport whose outcomes are scripted per channel id.
///
/// Latencies are returned as values, not slept, so elections are exact.
/// `hold_next` parks the next probe for an id until released, which lets a
/// test keep one round in flight while a newer round completes.
pub struct MockTransport {
    default: Mutex<Script>,
    scripts: Mutex<HashMap<String, Script>>,
    holds: Mutex<HashMap<String, VecDeque<Arc<Semaphore>>>>,
    messages: Mutex<VecDeque<FeedMessage>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            default: Mutex::new(Script::Latency(50)),
            scripts: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            messages: Mutex::new(VecDeque::new()),
        }
    }

    /// Script a successful probe with the given latency.
    pub fn set_latency(&self, id: &str, latency_ms: u64) {
        self.scripts
            .lock()
            .insert(id.to_string(), Script::Latency(latency_ms));
    }

    /// Script a probe failure.
    pub fn set_failure(&self, id: &str) {
        self.scripts.lock().insert(id.to_string(), Script::Fail);
    }

    /// Make every probe fail, clearing per-channel scripts.
    pub fn fail_all(&self) {
        self.scripts.lock().clear();
        *self.default.lock() = Script::Fail;
    }

    /// Latency used for ids without an explicit script.
    pub fn set_default_latency(&self, latency_ms: u64) {
        *self.default.lock() = Script::Latency(latency_ms);
    }

    /// Park the next probe of `id` until permits are added to the returned
    /// semaphore. Later probes of the same id pass through.
    pub fn hold_next(&self, id: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.holds
            .lock()
            .entry(id.to_string())
            .or_default()
            .push_back(Arc::clone(&gate));
        gate
    }

    /// Queue a message for the feed source.
    pub fn queue_message(&self, id: &str, message: &str) {
        self.messages.lock().push_back(FeedMessage {
            id: id.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeTransport for MockTransport {
    fn probe(&self, id: &str) -> ProbeFuture {
        let script = self
            .scripts
            .lock()
            .get(id)
            .copied()
            .unwrap_or(*self.default.lock());
        let gate = self
            .holds
            .lock()
            .get_mut(id)
            .and_then(|queue| queue.pop_front());

        Box::pin(async move {
            if let Some(gate) = gate {
                let _permit = gate.acquire().await;
            }
            match script {
                Script::Latency(latency_ms) => Ok(Duration::from_millis(latency_ms)),
                Script::Fail => Err(ProbeError::Status { status: 503 }),
            }
        })
    }
}

impl MessageSource for MockTransport {
    fn fetch(&self) -> MessageFuture {
        let next = self.messages.lock().pop_front();
        Box::pin(async move { next.ok_or(ProbeError::Status { status: 503 }) })
    }
}
