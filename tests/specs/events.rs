// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out scenarios: exactly-once delivery per attached subscriber.

use ov_core::{ConnectStatus, HostId, StatusEvent};
use ov_engine::test_support::{drain_events, ChannelSink};
use ov_engine::EventBus;
use std::time::Duration;

#[tokio::test]
async fn each_subscriber_gets_exactly_one_copy_until_detached() {
    let bus = EventBus::new(Duration::from_secs(5));
    let (alice, mut alice_rx) = ChannelSink::new();
    let (bob, mut bob_rx) = ChannelSink::new();
    bus.attach("alice", alice).await;
    bus.attach("bob", bob).await;

    let event = StatusEvent::host(HostId(42), ConnectStatus::Disconnected);
    bus.publish(&event).await;

    assert_eq!(drain_events(&mut alice_rx), vec![event.clone()]);
    assert_eq!(drain_events(&mut bob_rx), vec![event.clone()]);

    bus.detach("bob").await;
    bus.publish(&event).await;

    assert_eq!(drain_events(&mut alice_rx), vec![event]);
    assert!(drain_events(&mut bob_rx).is_empty());
}
