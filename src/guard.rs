//! Status transition guard with deferred-switch support.
//!
//! The sole entry point for externally-driven status changes. The guard lets
//! an operator hold the failure window open: with the delay-switch flag set,
//! an active channel going unavailable is recorded but reselection is owed
//! until the flag clears, instead of the selector immediately masking the
//! failure by re-electing.

use std::sync::Arc;

use crate::channel::{ChannelRegistry, ChannelStatus};
use crate::events::{ChannelEvent, Notifier};
use crate::selector::{FailoverSelector, RoundOutcome};

/// How one direct status change landed in the registry.
enum Applied {
    /// Id not present; nothing happened.
    Unknown,
    /// Deferred-switch path: channel marked unavailable, reselection owed.
    Deferred,
    /// Plain update applied.
    Updated {
        previous: ChannelStatus,
        all_unavailable: bool,
    },
}

/// Intercepts direct status mutations and applies the deferred-switch policy.
pub struct TransitionGuard {
    registry: Arc<ChannelRegistry>,
    notifier: Arc<Notifier>,
    selector: Arc<FailoverSelector>,
}

impl TransitionGuard {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        notifier: Arc<Notifier>,
        selector: Arc<FailoverSelector>,
    ) -> Self {
        Self {
            registry,
            notifier,
            selector,
        }
    }

    /// Apply an externally-driven status change.
    ///
    /// Emits `StatusChanged` for every applied change, `BecameAvailable` when
    /// the new status is not unavailable, and `AllUnavailable` when the change
    /// leaves every channel down. Unless the deferred-switch path was taken,
    /// the change triggers one full reselection round, whose outcome is
    /// returned. An unknown id is a complete no-op.
    pub async fn set_status(&self, id: &str, status: ChannelStatus) -> Option<RoundOutcome> {
        let applied = self.registry.mutate(|inner| {
            let Some(pos) = inner.channels.iter().position(|c| c.id == id) else {
                return Applied::Unknown;
            };

            let active_is_target = inner
                .channels
                .iter()
                .any(|c| c.status == ChannelStatus::Connected && c.id == id);

            if active_is_target && status == ChannelStatus::Unavailable && inner.delay_switch {
                for chan in inner.channels.iter_mut() {
                    if chan.id == id {
                        chan.status = ChannelStatus::Unavailable;
                    } else if chan.status == ChannelStatus::Connected {
                        chan.status = ChannelStatus::Idle;
                    }
                }
                inner.pending_switch = true;
                return Applied::Deferred;
            }

            let previous = inner.channels[pos].status;
            if status == ChannelStatus::Connected {
                for chan in inner.channels.iter_mut() {
                    if chan.id == id {
                        chan.status = ChannelStatus::Connected;
                    } else if chan.status == ChannelStatus::Connected {
                        chan.status = ChannelStatus::Idle;
                    }
                }
            } else {
                inner.channels[pos].status = status;
            }

            let all_unavailable = inner
                .channels
                .iter()
                .all(|c| c.status == ChannelStatus::Unavailable);
            Applied::Updated {
                previous,
                all_unavailable,
            }
        });

        match applied {
            Applied::Unknown => {
                tracing::debug!(target: "guard", channel = %id, "status change for unknown channel ignored");
                None
            }
            Applied::Deferred => {
                tracing::info!(
                    target: "guard",
                    channel = %id,
                    "active channel unavailable; switch deferred"
                );
                self.notifier.emit(ChannelEvent::StatusChanged {
                    id: id.to_string(),
                    status: ChannelStatus::Unavailable,
                });
                None
            }
            Applied::Updated {
                previous,
                all_unavailable,
            } => {
                if previous == ChannelStatus::Unavailable && status != ChannelStatus::Unavailable {
                    tracing::info!(
                        target: "guard",
                        channel = %id,
                        "channel recovered and available again"
                    );
                }

                self.notifier.emit(ChannelEvent::StatusChanged {
                    id: id.to_string(),
                    status,
                });
                if status != ChannelStatus::Unavailable {
                    self.notifier.emit(ChannelEvent::BecameAvailable {
                        id: id.to_string(),
                    });
                }
                if all_unavailable {
                    self.notifier.emit(ChannelEvent::AllUnavailable);
                }

                Some(self.selector.ping_all().await)
            }
        }
    }

    /// Toggle the delay-switch flag.
    ///
    /// Clearing the flag while a switch is pending runs the owed reselection
    /// round and returns its outcome.
    pub async fn set_delay_switch(&self, delay: bool) -> Option<RoundOutcome> {
        let run_pending = self.registry.mutate(|inner| {
            inner.delay_switch = delay;
            if !delay && inner.pending_switch {
                inner.pending_switch = false;
                true
            } else {
                false
            }
        });

        tracing::debug!(target: "guard", delay, run_pending, "delay switch toggled");

        if run_pending {
            Some(self.selector.ping_all().await)
        } else {
            None
        }
    }
}
