//! Message feed: a bounded buffer topped up while a channel is active and
//! drained on a fixed interval.
//!
//! The buffer absorbs short outages: while no channel is active the feed
//! stops fetching and keeps delivering whatever was buffered.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use tokio::task::JoinHandle;

use crate::channel::ChannelRegistry;
use crate::config::SettingsStore;
use crate::probe::{FeedMessage, MessageSource};
use crate::shutdown::ShutdownHandle;

/// FIFO message buffer bounded by the configured capacity.
pub struct FeedBuffer {
    inner: Mutex<VecDeque<FeedMessage>>,
}

impl FeedBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Append one message unless the buffer is at `capacity`.
    ///
    /// Returns false when the message was rejected.
    pub fn push(&self, message: FeedMessage, capacity: usize) -> bool {
        let mut inner = self.inner.lock();
        if inner.len() >= capacity {
            return false;
        }
        inner.push_back(message);
        true
    }

    /// Take the oldest buffered message.
    pub fn pop(&self) -> Option<FeedMessage> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for FeedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the feed: delivers one message per tick and keeps the buffer
/// topped up while an active channel exists.
pub struct FeedPoller {
    handle: JoinHandle<()>,
    history: Arc<Mutex<Vec<FeedMessage>>>,
}

impl FeedPoller {
    pub fn spawn(
        source: Arc<dyn MessageSource>,
        registry: Arc<ChannelRegistry>,
        settings: SettingsStore,
        shutdown: ShutdownHandle,
    ) -> Self {
        let history: Arc<Mutex<Vec<FeedMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let delivered = Arc::clone(&history);

        let handle = tokio::spawn(async move {
            let buffer = FeedBuffer::new();

            loop {
                let interval =
                    Duration::from_millis(settings.settings().message_interval_ms.max(1));
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let capacity = settings.settings().buffer_size;
                let active = registry.active_channel_id().is_some();

                if let Some(message) = buffer.pop() {
                    deliver(&delivered, message);
                } else if active {
                    match source.fetch().await {
                        Ok(message) => deliver(&delivered, message),
                        Err(err) => {
                            tracing::debug!(target: "feed", error = %err, "message fetch failed");
                        }
                    }
                }

                // Top up one message per tick while a channel is active.
                if active && buffer.len() < capacity {
                    match source.fetch().await {
                        Ok(message) => {
                            buffer.push(message, capacity);
                        }
                        Err(err) => {
                            tracing::debug!(target: "feed", error = %err, "buffer fill failed");
                        }
                    }
                }
            }
            tracing::debug!(target: "feed", "feed poller stopped");
        });

        Self { handle, history }
    }

    /// Delivered messages, newest first.
    pub fn messages(&self) -> Vec<FeedMessage> {
        self.history.lock().clone()
    }

    /// Wait for the feed task to finish after shutdown was signaled.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

fn deliver(history: &Mutex<Vec<FeedMessage>>, message: FeedMessage) {
    tracing::info!(
        target: "feed",
        id = %message.id,
        message = %message.message,
        "message delivered"
    );
    history.lock().insert(0, message);
}
