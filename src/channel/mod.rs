//! Channel data model and registry.

mod registry;

pub use registry::ChannelRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Latency recorded for a channel whose probe failed.
///
/// Treated as worse than any real measurement, so an unavailable channel can
/// never win an election on latency.
pub const UNAVAILABLE_LATENCY_MS: u64 = 9_999;

/// Observable status of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// The single channel currently designated to carry traffic.
    Connected,
    /// Reachable but not selected.
    Idle,
    /// Last probe (or an external signal) reported the channel down.
    Unavailable,
}

impl ChannelStatus {
    pub fn is_available(self) -> bool {
        !matches!(self, ChannelStatus::Unavailable)
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelStatus::Connected => "connected",
            ChannelStatus::Idle => "idle",
            ChannelStatus::Unavailable => "unavailable",
        };
        write!(f, "{}", s)
    }
}

/// One candidate backend endpoint.
///
/// Channels are created once from configuration and never destroyed; only
/// `status` and `latency_ms` mutate, exclusively through the selector and the
/// transition guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Stable unique identifier; also the tie-break key for elections.
    pub id: String,
    /// Display label, not used in selection logic.
    pub name: String,
    pub status: ChannelStatus,
    /// Last measured round-trip time in milliseconds.
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(ChannelStatus::Connected.to_string(), "connected");
        assert_eq!(ChannelStatus::Idle.to_string(), "idle");
        assert_eq!(ChannelStatus::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn only_unavailable_is_not_available() {
        assert!(ChannelStatus::Connected.is_available());
        assert!(ChannelStatus::Idle.is_available());
        assert!(!ChannelStatus::Unavailable.is_available());
    }
}
