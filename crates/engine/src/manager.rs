// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle of app checkers, keyed by app id.

use std::collections::HashMap;
use std::sync::Arc;

use ov_core::{AppConfig, AppId, AppSnapshot, AppState, Clock, OpsError, SystemClock};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bus::EventBus;
use crate::checker::{AppChecker, CheckerState};
use crate::pool::ConnectionPool;

pub struct CheckerManager<C: Clock = SystemClock> {
    pool: Arc<ConnectionPool<C>>,
    bus: EventBus,
    clock: C,
    /// Parent token; each checker runs under a child so a daemon
    /// shutdown cancels everything at once.
    shutdown: CancellationToken,
    checkers: RwLock<HashMap<AppId, CheckerEntry>>,
}

struct CheckerEntry {
    config: AppConfig,
    state: Arc<RwLock<CheckerState>>,
    shutdown: CancellationToken,
}

impl<C: Clock> CheckerManager<C> {
    pub fn new(
        pool: Arc<ConnectionPool<C>>,
        bus: EventBus,
        clock: C,
        shutdown: CancellationToken,
    ) -> Self {
        Self { pool, bus, clock, shutdown, checkers: RwLock::new(HashMap::new()) }
    }

    /// Validate the config, insert the record, and start its watchdog
    /// loop. Fails on duplicate app ids.
    pub fn create(&self, config: AppConfig) -> Result<(), OpsError> {
        config.validate()?;

        let mut checkers = self.checkers.write();
        if checkers.contains_key(&config.id) {
            return Err(OpsError::app_exists(config.id));
        }

        let state = Arc::new(RwLock::new(CheckerState {
            last_result: AppState::Unknown,
            last_check_ms: 0,
        }));
        let token = self.shutdown.child_token();
        let checker = AppChecker::new(
            config.clone(),
            Arc::clone(&self.pool),
            self.bus.clone(),
            self.clock.clone(),
            Arc::clone(&state),
            token.clone(),
        );
        tokio::spawn(checker.run());

        info!(app = %config.id, name = %config.name, "app checker started");
        checkers.insert(config.id, CheckerEntry { config, state, shutdown: token });
        Ok(())
    }

    /// Cancel the loop and drop the record. Idempotent; the loop stops
    /// at its next tick wait.
    pub fn remove(&self, id: AppId) {
        if let Some(entry) = self.checkers.write().remove(&id) {
            entry.shutdown.cancel();
            info!(app = %id, "app checker removed");
        }
    }

    /// Remove-then-create; the CRUD layer calls this after a config
    /// update.
    pub fn replace(&self, config: AppConfig) -> Result<(), OpsError> {
        self.remove(config.id);
        self.create(config)
    }

    pub fn get(&self, id: AppId) -> Option<AppSnapshot> {
        self.checkers.read().get(&id).map(snapshot_of)
    }

    /// Copy of all app records ordered by id.
    pub fn list(&self) -> Vec<AppSnapshot> {
        let mut out: Vec<_> = {
            let checkers = self.checkers.read();
            checkers.values().map(snapshot_of).collect()
        };
        out.sort_by_key(|snap| snap.id);
        out
    }

    pub fn count(&self) -> usize {
        self.checkers.read().len()
    }

    /// Cancel every checker (daemon shutdown).
    pub fn shutdown_all(&self) {
        let mut checkers = self.checkers.write();
        for (_, entry) in checkers.drain() {
            entry.shutdown.cancel();
        }
    }
}

fn snapshot_of(entry: &CheckerEntry) -> AppSnapshot {
    let state = entry.state.read();
    AppSnapshot {
        id: entry.config.id,
        name: entry.config.name.clone(),
        host: entry.config.host,
        check: entry.config.check,
        target: entry.config.target.clone(),
        interval_secs: entry.config.interval_secs,
        start_script: entry.config.start_script.clone(),
        auto_restart: entry.config.auto_restart,
        last_result: state.last_result,
        last_check_ms: state.last_check_ms,
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
