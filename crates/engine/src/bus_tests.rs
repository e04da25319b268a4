// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{drain_events, ChannelSink};
use ov_core::{ConnectStatus, HostId, StatusEvent};

fn event() -> StatusEvent {
    StatusEvent::host(HostId(42), ConnectStatus::Connected)
}

#[tokio::test]
async fn publish_reaches_every_subscriber_once() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (alice, mut alice_rx) = ChannelSink::new();
    let (bob, mut bob_rx) = ChannelSink::new();
    bus.attach("alice", alice).await;
    bus.attach("bob", bob).await;

    bus.publish(&event()).await;

    assert_eq!(drain_events(&mut alice_rx), vec![event()]);
    assert_eq!(drain_events(&mut bob_rx), vec![event()]);
}

#[tokio::test]
async fn detached_subscriber_stops_receiving() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (alice, mut alice_rx) = ChannelSink::new();
    let (bob, mut bob_rx) = ChannelSink::new();
    bus.attach("alice", alice).await;
    bus.attach("bob", Arc::clone(&bob) as Arc<dyn EventSink>).await;

    bus.detach("bob").await;
    assert!(bob.is_closed());
    bus.publish(&event()).await;

    assert_eq!(drain_events(&mut alice_rx).len(), 1);
    assert_eq!(drain_events(&mut bob_rx).len(), 0);
    assert_eq!(bus.subscriber_count().await, 1);
}

#[tokio::test]
async fn detach_is_idempotent() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (sink, _rx) = ChannelSink::new();
    bus.attach("alice", sink).await;
    bus.detach("alice").await;
    bus.detach("alice").await;
    assert_eq!(bus.subscriber_count().await, 0);
}

#[tokio::test]
async fn attach_with_same_key_replaces_and_closes_old() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (old, mut old_rx) = ChannelSink::new();
    let (new, mut new_rx) = ChannelSink::new();
    bus.attach("alice", Arc::clone(&old) as Arc<dyn EventSink>).await;
    bus.attach("alice", new).await;

    assert!(old.is_closed());
    assert_eq!(bus.subscriber_count().await, 1);

    bus.publish(&event()).await;
    assert_eq!(drain_events(&mut old_rx).len(), 0);
    assert_eq!(drain_events(&mut new_rx).len(), 1);
}

#[tokio::test]
async fn write_failure_keeps_the_subscriber_registered() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (dead, rx) = ChannelSink::new();
    drop(rx);
    bus.attach("dead", dead).await;

    bus.publish(&event()).await;
    bus.publish(&event()).await;

    // Still registered; removal is its read loop's job.
    assert_eq!(bus.subscriber_count().await, 1);
}
