//! Failover selection: concurrent probe rounds and winner election.
//!
//! One round probes every channel in parallel, elects the alive channel with
//! the lowest latency (ties broken by the lexically smaller id), and applies
//! the result as a single atomic list replacement. Rounds are versioned: the
//! most recently *started* round wins, so a slow round that finishes after a
//! newer one started is discarded in full.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::channel::{Channel, ChannelRegistry, ChannelStatus, UNAVAILABLE_LATENCY_MS};
use crate::events::{ChannelEvent, Notifier};
use crate::probe::ProbeTransport;

/// Version token for one probe round, handed out by
/// [`FailoverSelector::begin_round`] and checked at apply time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundToken(u64);

/// What a completed round did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The round was applied and `active` is now the connected channel.
    Applied { active: String, switched: bool },
    /// The round was applied and found every channel unavailable.
    AllUnavailable,
    /// A newer round started before this one could apply; nothing changed.
    Stale,
}

/// Result of probing one channel within a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    pub id: String,
    pub status: ChannelStatus,
    pub latency_ms: u64,
}

/// Runs probe rounds and elects the active channel.
pub struct FailoverSelector {
    registry: Arc<ChannelRegistry>,
    notifier: Arc<Notifier>,
    transport: Arc<dyn ProbeTransport>,
    /// Total order over round starts. Held across the apply check so a round
    /// beginning mid-apply cannot slip between check and replacement.
    rounds: Mutex<u64>,
}

impl FailoverSelector {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        notifier: Arc<Notifier>,
        transport: Arc<dyn ProbeTransport>,
    ) -> Self {
        Self {
            registry,
            notifier,
            transport,
            rounds: Mutex::new(0),
        }
    }

    /// Start a new round, superseding every round started earlier.
    pub fn begin_round(&self) -> RoundToken {
        let mut rounds = self.rounds.lock();
        *rounds += 1;
        RoundToken(*rounds)
    }

    /// Probe every channel concurrently and apply the election.
    ///
    /// Never fails: individual probe failures demote their channel to
    /// unavailable, and a superseded round resolves to [`RoundOutcome::Stale`]
    /// without touching the registry.
    pub async fn ping_all(&self) -> RoundOutcome {
        let token = self.begin_round();
        let channels = self.registry.snapshot();

        let mut tasks = Vec::with_capacity(channels.len());
        for chan in &channels {
            let transport = Arc::clone(&self.transport);
            let id = chan.id.clone();
            tasks.push((
                chan.id.clone(),
                tokio::spawn(async move { transport.probe(&id).await }),
            ));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (id, task) in tasks {
            let record = match task.await {
                Ok(Ok(elapsed)) => ProbeRecord {
                    id,
                    status: ChannelStatus::Idle,
                    latency_ms: elapsed.as_millis() as u64,
                },
                Ok(Err(err)) => {
                    tracing::debug!(target: "selector", channel = %id, error = %err, "probe failed");
                    ProbeRecord {
                        id,
                        status: ChannelStatus::Unavailable,
                        latency_ms: UNAVAILABLE_LATENCY_MS,
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "selector", channel = %id, error = %err, "probe task failed");
                    ProbeRecord {
                        id,
                        status: ChannelStatus::Unavailable,
                        latency_ms: UNAVAILABLE_LATENCY_MS,
                    }
                }
            };
            results.push(record);
        }

        self.apply_round(token, results)
    }

    /// Apply one round's results, unless a newer round has started.
    ///
    /// The staleness check and the list replacement happen inside the same
    /// round-counter critical section, making "most recently started wins"
    /// exact even when rounds overlap.
    pub fn apply_round(&self, token: RoundToken, results: Vec<ProbeRecord>) -> RoundOutcome {
        let rounds = self.rounds.lock();
        if *rounds != token.0 {
            return RoundOutcome::Stale;
        }

        let by_id: HashMap<String, ProbeRecord> =
            results.into_iter().map(|r| (r.id.clone(), r)).collect();

        let (outcome, events) = self.registry.mutate(|inner| {
            let previous_active = inner
                .channels
                .iter()
                .find(|c| c.status == ChannelStatus::Connected)
                .map(|c| c.id.clone());

            for chan in inner.channels.iter_mut() {
                if let Some(record) = by_id.get(&chan.id) {
                    chan.status = record.status;
                    chan.latency_ms = record.latency_ms;
                }
            }

            let winner =
                elect(&inner.channels).map(|c| (c.id.clone(), c.name.clone(), c.latency_ms));
            match winner {
                Some((winner_id, winner_name, winner_latency)) => {
                    for chan in inner.channels.iter_mut() {
                        if chan.id == winner_id {
                            chan.status = ChannelStatus::Connected;
                        } else if chan.status != ChannelStatus::Unavailable {
                            chan.status = ChannelStatus::Idle;
                        }
                    }

                    let switched = previous_active.as_deref() != Some(winner_id.as_str());
                    let mut events = Vec::new();
                    if switched {
                        tracing::info!(
                            target: "selector",
                            channel = %winner_id,
                            name = %winner_name,
                            latency_ms = winner_latency,
                            "active channel elected"
                        );
                        events.push(ChannelEvent::Switched {
                            id: winner_id.clone(),
                        });
                    }
                    (
                        RoundOutcome::Applied {
                            active: winner_id,
                            switched,
                        },
                        events,
                    )
                }
                None => {
                    tracing::error!(target: "selector", "no channels available");
                    (RoundOutcome::AllUnavailable, vec![ChannelEvent::AllUnavailable])
                }
            }
        });
        drop(rounds);

        for event in events {
            self.notifier.emit(event);
        }
        outcome
    }
}

/// Pick the election winner: lowest latency among non-unavailable channels,
/// ties broken by the lexically smaller id.
///
/// The tie-break makes the result independent of probe completion order and
/// of list iteration order.
fn elect(channels: &[Channel]) -> Option<&Channel> {
    channels
        .iter()
        .filter(|c| c.status != ChannelStatus::Unavailable)
        .min_by(|a, b| {
            a.latency_ms
                .cmp(&b.latency_ms)
                .then_with(|| a.id.cmp(&b.id))
        })
}
