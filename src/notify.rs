//! Bounded notification log fed by channel events.
//!
//! The non-rendering remnant of the original toast viewer: keeps the most
//! recent entries for display, and drops everything while notifications are
//! disabled in settings.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::channel::ChannelStatus;
use crate::config::SettingsStore;
use crate::events::{ChannelEvent, EventSink};

/// How many entries the log retains.
pub const NOTIFICATION_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Event sink retaining the last [`NOTIFICATION_CAPACITY`] notifications.
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    settings: SettingsStore,
}

impl NotificationLog {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(NOTIFICATION_CAPACITY)),
            settings,
        }
    }

    /// Current entries, oldest first.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, notification: Notification) {
        let mut entries = self.entries.lock();
        while entries.len() >= NOTIFICATION_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}

fn describe(event: &ChannelEvent) -> Notification {
    match event {
        ChannelEvent::StatusChanged { id, status } => Notification {
            level: if *status == ChannelStatus::Unavailable {
                NotificationLevel::Warn
            } else {
                NotificationLevel::Info
            },
            message: format!("channel {} status changed to {}", id, status),
        },
        ChannelEvent::BecameAvailable { id } => Notification {
            level: NotificationLevel::Info,
            message: format!("channel {} became available", id),
        },
        ChannelEvent::AllUnavailable => Notification {
            level: NotificationLevel::Error,
            message: "no channels available".to_string(),
        },
        ChannelEvent::Switched { id } => Notification {
            level: NotificationLevel::Info,
            message: format!("active channel switched to {}", id),
        },
    }
}

impl EventSink for NotificationLog {
    fn notify(&self, event: &ChannelEvent) {
        if !self.settings.settings().notifications_enabled {
            return;
        }
        self.push(describe(event));
    }
}
