//! Election behavior of `ping_all`: latency ordering, deterministic
//! tie-break, and the all-unavailable steady state.

mod common;

use common::{connected_count, harness};
use relayswitch::channel::{ChannelStatus, UNAVAILABLE_LATENCY_MS};
use relayswitch::events::ChannelEvent;
use relayswitch::selector::RoundOutcome;

#[tokio::test]
async fn elects_fastest_alive_channel() {
    let h = harness();
    h.transport.set_default_latency(100);
    h.transport.set_latency("2", 40);

    let outcome = h.selector.ping_all().await;

    assert_eq!(
        outcome,
        RoundOutcome::Applied {
            active: "2".to_string(),
            switched: true,
        }
    );
    assert_eq!(h.registry.active_channel_id(), Some("2".to_string()));
    assert_eq!(connected_count(&h.registry), 1);
    assert!(h.events.contains(&ChannelEvent::Switched {
        id: "2".to_string()
    }));
}

#[tokio::test]
async fn equal_latency_elects_lexically_smaller_id() {
    let h = harness();
    h.transport.set_default_latency(30);

    h.selector.ping_all().await;

    assert_eq!(h.registry.active_channel_id(), Some("1".to_string()));
}

#[tokio::test]
async fn tie_break_skips_failed_channels() {
    let h = harness();
    h.transport.set_default_latency(30);
    h.transport.set_failure("1");

    h.selector.ping_all().await;

    assert_eq!(h.registry.active_channel_id(), Some("2".to_string()));
    let one = h.registry.channel("1").unwrap();
    assert_eq!(one.status, ChannelStatus::Unavailable);
    assert_eq!(one.latency_ms, UNAVAILABLE_LATENCY_MS);
}

#[tokio::test]
async fn no_switched_event_when_winner_unchanged() {
    let h = harness();
    h.transport.set_default_latency(80);
    h.transport.set_latency("1", 10);

    let first = h.selector.ping_all().await;
    assert_eq!(
        first,
        RoundOutcome::Applied {
            active: "1".to_string(),
            // Channel "1" starts out connected, so the winner kept its seat.
            switched: false,
        }
    );
    h.events.clear();

    let second = h.selector.ping_all().await;
    assert_eq!(
        second,
        RoundOutcome::Applied {
            active: "1".to_string(),
            switched: false,
        }
    );
    assert!(!h
        .events
        .events()
        .iter()
        .any(|e| matches!(e, ChannelEvent::Switched { .. })));
}

#[tokio::test]
async fn losers_are_idled_and_failures_kept_unavailable() {
    let h = harness();
    h.transport.set_default_latency(60);
    h.transport.set_latency("3", 10);
    h.transport.set_failure("5");

    h.selector.ping_all().await;

    let by_id = |id: &str| h.registry.channel(id).unwrap().status;
    assert_eq!(by_id("3"), ChannelStatus::Connected);
    assert_eq!(by_id("1"), ChannelStatus::Idle);
    assert_eq!(by_id("2"), ChannelStatus::Idle);
    assert_eq!(by_id("4"), ChannelStatus::Idle);
    assert_eq!(by_id("5"), ChannelStatus::Unavailable);
    assert_eq!(by_id("6"), ChannelStatus::Idle);
    assert_eq!(connected_count(&h.registry), 1);
}

#[tokio::test]
async fn all_failures_yield_all_unavailable_repeatedly() {
    let h = harness();
    h.transport.fail_all();

    for _ in 0..3 {
        let outcome = h.selector.ping_all().await;
        assert_eq!(outcome, RoundOutcome::AllUnavailable);
        assert_eq!(h.registry.active_channel_id(), None);
        assert!(h
            .registry
            .snapshot()
            .iter()
            .all(|c| c.status == ChannelStatus::Unavailable));
    }

    // One event per round, and nothing else changed.
    assert_eq!(h.events.count(&ChannelEvent::AllUnavailable), 3);
    assert_eq!(connected_count(&h.registry), 0);
}

#[tokio::test]
async fn returns_to_recovered_channel_when_faster() {
    let h = harness();
    h.transport.set_default_latency(100);
    h.transport.set_failure("1");
    h.transport.set_latency("2", 10);
    h.selector.ping_all().await;
    assert_eq!(h.registry.active_channel_id(), Some("2".to_string()));
    h.events.clear();

    // "1" comes back faster than the current active channel.
    h.transport.set_latency("1", 5);
    h.transport.set_latency("2", 50);
    h.selector.ping_all().await;

    assert_eq!(h.registry.active_channel_id(), Some("1".to_string()));
    assert!(h.events.contains(&ChannelEvent::Switched {
        id: "1".to_string()
    }));
}

#[tokio::test]
async fn stays_on_current_channel_when_recovered_one_is_slower() {
    let h = harness();
    h.transport.set_default_latency(100);
    h.transport.set_failure("1");
    h.transport.set_latency("2", 10);
    h.selector.ping_all().await;
    h.events.clear();

    h.transport.set_latency("1", 200);
    h.selector.ping_all().await;

    assert_eq!(h.registry.active_channel_id(), Some("2".to_string()));
    assert!(!h.events.contains(&ChannelEvent::Switched {
        id: "1".to_string()
    }));
}

#[tokio::test]
async fn self_heals_after_total_outage() {
    let h = harness();
    h.transport.fail_all();
    assert_eq!(h.selector.ping_all().await, RoundOutcome::AllUnavailable);

    h.transport.set_default_latency(40);
    let outcome = h.selector.ping_all().await;

    assert_eq!(
        outcome,
        RoundOutcome::Applied {
            active: "1".to_string(),
            switched: true,
        }
    );
    assert_eq!(connected_count(&h.registry), 1);
}
