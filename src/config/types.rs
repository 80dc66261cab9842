use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ChannelStatus};

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

/// Tunable settings, persisted back to the config file when changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// How often the scheduler runs a probe round, in milliseconds.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
    /// How often the feed delivers a message, in milliseconds.
    #[serde(default = "default_message_interval_ms")]
    pub message_interval_ms: u64,
    /// Capacity of the feed message buffer.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// When false, the notification log drops every entry.
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
    /// Base URL of the playground API. When absent, an embedded mock API is
    /// started and used instead.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Connection timeout for transport operations (default: 1000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total per-request timeout for transport operations (default: 5000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_ping_interval_ms() -> u64 {
    3000
}

fn default_message_interval_ms() -> u64 {
    4000
}

fn default_buffer_size() -> usize {
    10
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    5000
}

/// One configured channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Unique identifier; also the election tie-break key.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Initial status at startup.
    #[serde(default = "default_channel_status")]
    pub status: ChannelStatus,
    /// Seed latency shown before the first probe round completes.
    #[serde(default)]
    pub latency_ms: u64,
}

fn default_channel_status() -> ChannelStatus {
    ChannelStatus::Idle
}

fn default_channels() -> Vec<ChannelConfig> {
    let seed = [
        ("1", "main", ChannelStatus::Connected, 20),
        ("2", "reserve-1", ChannelStatus::Idle, 100),
        ("3", "reserve-2", ChannelStatus::Idle, 200),
        ("4", "other-1", ChannelStatus::Idle, 150),
        ("5", "other-2", ChannelStatus::Idle, 300),
        ("6", "failover", ChannelStatus::Unavailable, 999),
    ];
    seed.into_iter()
        .map(|(id, name, status, latency_ms)| ChannelConfig {
            id: id.to_string(),
            name: name.to_string(),
            status,
            latency_ms,
        })
        .collect()
}

impl Config {
    /// Build the runtime channel set from configuration, in file order.
    pub fn channel_set(&self) -> Vec<Channel> {
        self.channels
            .iter()
            .map(|c| Channel {
                id: c.id.clone(),
                name: c.name.clone(),
                status: c.status,
                latency_ms: c.latency_ms,
            })
            .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ping_interval_ms: default_ping_interval_ms(),
            message_interval_ms: default_message_interval_ms(),
            buffer_size: default_buffer_size(),
            notifications_enabled: default_notifications_enabled(),
            api_base_url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            channels: default_channels(),
        }
    }
}
