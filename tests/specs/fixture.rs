// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared rig: engine services over a scripted transport, observed
//! through a channel subscriber. Tests run on the paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use ov_adapters::FakeTransport;
use ov_core::{FakeClock, StatusEvent};
use ov_engine::test_support::{drain_events, ChannelSink};
use ov_engine::{CheckerManager, ConnectionPool, EventBus, PoolConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct Rig {
    pub transport: FakeTransport,
    pub pool: Arc<ConnectionPool<FakeClock>>,
    pub manager: CheckerManager<FakeClock>,
    pub shutdown: CancellationToken,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Rig {
    /// Events observed since the last call.
    pub fn events(&mut self) -> Vec<StatusEvent> {
        drain_events(&mut self.rx)
    }
}

/// Engine with a 1-second pool probe and an attached observer.
pub async fn rig(capacity: usize) -> Rig {
    let transport = FakeTransport::new();
    let bus = EventBus::new(Duration::from_secs(5));
    let (sink, rx) = ChannelSink::new();
    bus.attach("observer", sink).await;

    let clock = FakeClock::new();
    let pool_config = PoolConfig {
        capacity,
        probe_interval: Duration::from_secs(1),
        dial_timeout: Duration::from_secs(1),
        command_timeout: Duration::from_secs(1),
    };
    let pool = Arc::new(ConnectionPool::new(
        Arc::new(transport.clone()),
        bus.clone(),
        pool_config,
        clock.clone(),
    ));
    let shutdown = CancellationToken::new();
    pool.spawn_probe(shutdown.child_token());
    let manager =
        CheckerManager::new(Arc::clone(&pool), bus.clone(), clock, shutdown.child_token());

    Rig { transport, pool, manager, shutdown, rx }
}

/// Advance the paused clock and let every woken task run.
pub async fn tick(secs: u64) {
    tokio::time::advance(Duration::from_secs(secs)).await;
    for _ in 0..30 {
        tokio::task::yield_now().await;
    }
}
