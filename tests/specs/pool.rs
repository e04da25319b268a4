// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host lifecycle scenarios: outage detection, reconnection, capacity.

use ov_core::test_support::host_config;
use ov_core::{ConnectStatus, HostId, OpsError, StatusEvent};

use crate::fixture::{rig, tick};

#[tokio::test(start_paused = true)]
async fn outage_is_published_and_recovery_follows_within_an_interval() {
    let mut rig = rig(8).await;

    // {id: 42, addr: "10.0.0.5", port: 22, user: "ops", password auth}
    rig.pool.register(host_config(42)).await.unwrap();
    assert_eq!(
        rig.events(),
        vec![StatusEvent::host(HostId(42), ConnectStatus::Connected)]
    );

    // The transport accepted once; from here on the link is dead and
    // redials are refused.
    rig.transport.cut_link();
    rig.transport.refuse_dials();

    tick(1).await;
    tick(1).await;

    assert_eq!(rig.pool.get(HostId(42)).unwrap().status, ConnectStatus::Disconnected);
    let events = rig.events();
    assert!(events.contains(&StatusEvent::host(HostId(42), ConnectStatus::Disconnected)));
    assert!(!events.contains(&StatusEvent::host(HostId(42), ConnectStatus::Connected)));

    // Flip the stub back to accepting: the next probe reconnects.
    rig.transport.restore_link();
    rig.transport.accept_dials();
    tick(1).await;

    assert_eq!(rig.pool.get(HostId(42)).unwrap().status, ConnectStatus::Connected);
    let events = rig.events();
    assert_eq!(
        events.last(),
        Some(&StatusEvent::host(HostId(42), ConnectStatus::Connected))
    );

    rig.shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn registering_past_capacity_fails_and_leaves_the_pool_untouched() {
    let rig = rig(3).await;
    for id in [2, 3, 4] {
        rig.pool.register(host_config(id)).await.unwrap();
    }

    let err = rig.pool.register(host_config(5)).await.unwrap_err();
    assert_eq!(err, OpsError::CapacityExceeded { capacity: 3 });

    assert_eq!(rig.pool.remote_count(), 3);
    assert!(rig.pool.get(HostId(5)).is_none());
    // Capacity rejection happens before any dial.
    assert_eq!(rig.transport.dial_count(), 3);

    rig.shutdown.cancel();
}
