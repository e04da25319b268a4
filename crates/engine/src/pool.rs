// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection pool: lifecycle of authenticated sessions to remote hosts.
//!
//! The pool owns one record per registered host plus the singleton local
//! pseudo-host. A background task probes liveness on a fixed cadence;
//! failed probes drop the session, publish a status delta, and attempt
//! one reconnect. Status transitions always happen under the write lock,
//! owned by whichever task observed them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ov_adapters::{LocalExec, SessionHandle, Transport};
use ov_core::{
    Clock, ConnectStatus, HostConfig, HostId, HostSnapshot, OpsError, StatusEvent, SystemClock,
};
use parking_lot::RwLock;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::EventBus;

/// Pool tunables; defaults match the supervisor's documented budgets.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of registered remote hosts.
    pub capacity: usize,
    /// Cadence of the background liveness probe.
    pub probe_interval: Duration,
    pub dial_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            probe_interval: Duration::from_secs(30),
            dial_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
        }
    }
}

struct HostEntry {
    config: HostConfig,
    status: ConnectStatus,
    /// Timer-domain timestamp of the last completed probe; drives the
    /// due check.
    last_probe: Instant,
    /// Epoch-domain timestamp for snapshots.
    last_check_ms: u64,
    /// A probe for this host is in flight; skip it on the next tick.
    probing: bool,
    session: Option<Arc<dyn SessionHandle>>,
}

pub struct ConnectionPool<C: Clock = SystemClock> {
    transport: Arc<dyn Transport>,
    local: LocalExec,
    bus: EventBus,
    clock: C,
    config: PoolConfig,
    hosts: RwLock<HashMap<HostId, HostEntry>>,
}

impl<C: Clock> ConnectionPool<C> {
    pub fn new(transport: Arc<dyn Transport>, bus: EventBus, config: PoolConfig, clock: C) -> Self {
        Self {
            transport,
            local: LocalExec,
            bus,
            clock,
            config,
            hosts: RwLock::new(HashMap::new()),
        }
    }

    /// Reserve the id and synchronously attempt to connect.
    ///
    /// On connect failure the record stays registered as disconnected
    /// (the probe task will keep retrying) and the error is returned to
    /// the caller. Rejected outright: the reserved local id, duplicate
    /// ids, and registrations past capacity.
    pub async fn register(&self, config: HostConfig) -> Result<(), OpsError> {
        if config.id.is_local() {
            return Err(OpsError::host_exists(config.id));
        }

        {
            let mut hosts = self.hosts.write();
            if hosts.contains_key(&config.id) {
                return Err(OpsError::host_exists(config.id));
            }
            if hosts.len() >= self.config.capacity {
                return Err(OpsError::CapacityExceeded { capacity: self.config.capacity });
            }
            hosts.insert(
                config.id,
                HostEntry {
                    config: config.clone(),
                    status: ConnectStatus::Connecting,
                    last_probe: Instant::now(),
                    last_check_ms: self.clock.epoch_ms(),
                    probing: false,
                    session: None,
                },
            );
        }

        match self.transport.open(&config).await {
            Ok(handle) => {
                let stale = {
                    let mut hosts = self.hosts.write();
                    match hosts.get_mut(&config.id) {
                        Some(entry) => {
                            entry.status = ConnectStatus::Connected;
                            entry.last_probe = Instant::now();
                            entry.last_check_ms = self.clock.epoch_ms();
                            entry.session.replace(handle)
                        }
                        // Unregistered while we were dialing.
                        None => Some(handle),
                    }
                };
                if let Some(old) = stale {
                    old.close().await;
                }
                info!(host = %config.id, endpoint = %config.endpoint(), "host connected");
                self.bus.publish(&StatusEvent::host(config.id, ConnectStatus::Connected)).await;
                Ok(())
            }
            Err(e) => {
                let mut hosts = self.hosts.write();
                if let Some(entry) = hosts.get_mut(&config.id) {
                    entry.status = ConnectStatus::Disconnected;
                }
                warn!(host = %config.id, error = %e, "host registered but connect failed");
                Err(e)
            }
        }
    }

    /// Close and remove the host. Missing ids and the local id are
    /// no-ops.
    pub async fn unregister(&self, id: HostId) {
        if id.is_local() {
            return;
        }
        let removed = self.hosts.write().remove(&id);
        if let Some(entry) = removed {
            if let Some(session) = entry.session {
                session.close().await;
            }
            info!(host = %id, "host unregistered");
        }
    }

    pub fn get(&self, id: HostId) -> Option<HostSnapshot> {
        if id.is_local() {
            return Some(HostSnapshot::local(self.clock.epoch_ms()));
        }
        self.hosts.read().get(&id).map(snapshot_of)
    }

    /// Copy of all host records, local included, ordered by id.
    pub fn list(&self) -> Vec<HostSnapshot> {
        let mut out: Vec<_> = {
            let hosts = self.hosts.read();
            hosts.values().map(snapshot_of).collect()
        };
        out.push(HostSnapshot::local(self.clock.epoch_ms()));
        out.sort_by_key(|snap| snap.id);
        out
    }

    /// Number of registered remote hosts.
    pub fn remote_count(&self) -> usize {
        self.hosts.read().len()
    }

    /// Run a command on the host.
    ///
    /// Local commands go to the local executor. Remote commands probe
    /// the session first; a failed probe drops the session, publishes
    /// the transition, and fails the call without touching the remote.
    pub async fn execute(&self, id: HostId, command: &str) -> Result<String, OpsError> {
        if id.is_local() {
            return self.local.execute(command, self.config.command_timeout).await;
        }

        let session = {
            let hosts = self.hosts.read();
            let entry = hosts.get(&id).ok_or_else(|| OpsError::host_missing(id))?;
            entry.session.clone()
        };
        let Some(session) = session else {
            return Err(OpsError::not_connected(id));
        };

        if let Err(e) = session.keepalive().await {
            debug!(host = %id, error = %e, "keepalive before execute failed");
            self.drop_session(id, &session).await;
            return Err(OpsError::not_connected(id));
        }

        session.execute(command, self.config.command_timeout).await
    }

    /// Spawn the background liveness probe. Each tick probes hosts whose
    /// last probe is at least one interval old, in parallel across hosts
    /// and serialized per host.
    pub fn spawn_probe(self: &Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(pool.config.probe_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => pool.probe_tick(),
                }
            }
            debug!("pool probe task stopped");
        })
    }

    /// Close every session (daemon shutdown).
    pub async fn close_all(&self) {
        let sessions: Vec<_> = {
            let mut hosts = self.hosts.write();
            hosts
                .values_mut()
                .filter_map(|entry| {
                    entry.status = ConnectStatus::Disconnected;
                    entry.session.take()
                })
                .collect()
        };
        for session in sessions {
            session.close().await;
        }
    }

    fn probe_tick(self: &Arc<Self>) {
        let due: Vec<(HostId, HostConfig, Option<Arc<dyn SessionHandle>>)> = {
            let mut hosts = self.hosts.write();
            let interval = self.config.probe_interval;
            hosts
                .iter_mut()
                .filter(|(_, entry)| !entry.probing && entry.last_probe.elapsed() >= interval)
                .map(|(id, entry)| {
                    entry.probing = true;
                    (*id, entry.config.clone(), entry.session.clone())
                })
                .collect()
        };

        for (id, config, session) in due {
            let pool = Arc::clone(self);
            tokio::spawn(async move { pool.probe_host(id, config, session).await });
        }
    }

    async fn probe_host(
        self: Arc<Self>,
        id: HostId,
        config: HostConfig,
        session: Option<Arc<dyn SessionHandle>>,
    ) {
        let alive = match &session {
            Some(session) => session.keepalive().await.is_ok(),
            None => false,
        };

        if alive {
            let mut hosts = self.hosts.write();
            if let Some(entry) = hosts.get_mut(&id) {
                entry.probing = false;
                entry.last_probe = Instant::now();
                entry.last_check_ms = self.clock.epoch_ms();
            }
            return;
        }

        // Dead or never connected: drop the handle, publish, and attempt
        // one reconnect. The next tick retries on failure.
        let (present, dropped) = {
            let mut hosts = self.hosts.write();
            match hosts.get_mut(&id) {
                Some(entry) => {
                    entry.status = ConnectStatus::Disconnected;
                    entry.last_check_ms = self.clock.epoch_ms();
                    (true, entry.session.take())
                }
                // Unregistered while the probe was in flight.
                None => (false, None),
            }
        };
        if let Some(old) = dropped {
            old.close().await;
        }
        if !present {
            return;
        }

        warn!(host = %id, "liveness probe failed");
        self.bus.publish(&StatusEvent::host(id, ConnectStatus::Disconnected)).await;

        match self.transport.open(&config).await {
            Ok(handle) => {
                let mut reinstalled = false;
                let stale = {
                    let mut hosts = self.hosts.write();
                    match hosts.get_mut(&id) {
                        Some(entry) => {
                            entry.status = ConnectStatus::Connected;
                            entry.last_probe = Instant::now();
                            entry.last_check_ms = self.clock.epoch_ms();
                            entry.probing = false;
                            reinstalled = true;
                            entry.session.replace(handle)
                        }
                        None => Some(handle),
                    }
                };
                if let Some(old) = stale {
                    old.close().await;
                }
                if reinstalled {
                    info!(host = %id, "host reconnected");
                    self.bus.publish(&StatusEvent::host(id, ConnectStatus::Connected)).await;
                }
            }
            Err(e) => {
                warn!(host = %id, error = %e, "reconnect failed");
                let mut hosts = self.hosts.write();
                if let Some(entry) = hosts.get_mut(&id) {
                    entry.probing = false;
                    entry.last_probe = Instant::now();
                }
            }
        }
    }

    /// Drop the host's session and publish the transition. No-op when a
    /// newer session has already been installed.
    async fn drop_session(&self, id: HostId, observed: &Arc<dyn SessionHandle>) {
        let dropped = {
            let mut hosts = self.hosts.write();
            match hosts.get_mut(&id) {
                Some(entry) => match &entry.session {
                    Some(current) if Arc::ptr_eq(current, observed) => {
                        entry.status = ConnectStatus::Disconnected;
                        entry.last_check_ms = self.clock.epoch_ms();
                        entry.session.take()
                    }
                    _ => None,
                },
                None => None,
            }
        };
        if let Some(session) = dropped {
            session.close().await;
            self.bus.publish(&StatusEvent::host(id, ConnectStatus::Disconnected)).await;
        }
    }
}

fn snapshot_of(entry: &HostEntry) -> HostSnapshot {
    HostSnapshot {
        id: entry.config.id,
        addr: entry.config.addr.clone(),
        port: entry.config.port,
        user: entry.config.user.clone(),
        auth: entry.config.credential.kind().to_string(),
        status: entry.status,
        last_check_ms: entry.last_check_ms,
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
