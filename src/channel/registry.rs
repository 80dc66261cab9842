//! The authoritative channel list and switch flags.
//!
//! Every mutation is a full-list replace-by-transform under a single write
//! lock, so readers never observe a half-updated list.

use parking_lot::RwLock;

use crate::channel::{Channel, ChannelStatus};

pub(crate) struct RegistryInner {
    /// Ordered as configured; order is stable for the process lifetime.
    pub(crate) channels: Vec<Channel>,
    /// When true, an active channel going unavailable does not trigger
    /// immediate reselection.
    pub(crate) delay_switch: bool,
    /// A reselection is owed once `delay_switch` is cleared.
    pub(crate) pending_switch: bool,
}

/// Thread-safe registry of all known channels.
///
/// Holds no selection logic of its own; the selector and the transition
/// guard perform their transforms through [`ChannelRegistry::mutate`].
pub struct ChannelRegistry {
    inner: RwLock<RegistryInner>,
}

impl ChannelRegistry {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                channels,
                delay_switch: false,
                pending_switch: false,
            }),
        }
    }

    /// Get a clone of the current channel list, in configuration order.
    pub fn snapshot(&self) -> Vec<Channel> {
        self.inner.read().channels.clone()
    }

    /// Look up a single channel by id.
    pub fn channel(&self, id: &str) -> Option<Channel> {
        self.inner.read().channels.iter().find(|c| c.id == id).cloned()
    }

    /// Id of the connected channel, or `None`. Pure read, no mutation.
    pub fn active_channel_id(&self) -> Option<String> {
        self.inner
            .read()
            .channels
            .iter()
            .find(|c| c.status == ChannelStatus::Connected)
            .map(|c| c.id.clone())
    }

    /// Unconditionally update the named channel's latency.
    ///
    /// No side effects, no events. An unknown id is a silent no-op.
    pub fn set_latency(&self, id: &str, latency_ms: u64) {
        let mut inner = self.inner.write();
        if let Some(chan) = inner.channels.iter_mut().find(|c| c.id == id) {
            chan.latency_ms = latency_ms;
        }
    }

    pub fn delay_switch(&self) -> bool {
        self.inner.read().delay_switch
    }

    pub fn pending_switch(&self) -> bool {
        self.inner.read().pending_switch
    }

    /// Run one transform over the full registry state under the write lock.
    ///
    /// This is the single mutation primitive: callers read the current state,
    /// compute the replacement, and return before any other reader or writer
    /// can interleave.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut RegistryInner) -> R) -> R {
        let mut inner = self.inner.write();
        f(&mut inner)
    }
}
