// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-application watchdog loop.
//!
//! Every tick the checker builds a probe command from the check kind,
//! runs it through the pool, and publishes liveness deltas. Up events
//! are edge-triggered; down events repeat every tick while the failure
//! persists. Probe errors of any kind (host missing, host disconnected,
//! transport failure) read as "down", never as a checker failure.

use std::sync::Arc;

use ov_core::{AppConfig, AppState, CheckKind, Clock, StatusEvent};
use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bus::EventBus;
use crate::pool::ConnectionPool;

/// Probe outcome shared with the manager for snapshots.
pub(crate) struct CheckerState {
    pub last_result: AppState,
    pub last_check_ms: u64,
}

pub(crate) struct AppChecker<C: Clock> {
    config: AppConfig,
    pool: Arc<ConnectionPool<C>>,
    bus: EventBus,
    clock: C,
    state: Arc<RwLock<CheckerState>>,
    shutdown: CancellationToken,
}

impl<C: Clock> AppChecker<C> {
    pub(crate) fn new(
        config: AppConfig,
        pool: Arc<ConnectionPool<C>>,
        bus: EventBus,
        clock: C,
        state: Arc<RwLock<CheckerState>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { config, pool, bus, clock, state, shutdown }
    }

    /// Tick until canceled. An in-flight probe completes before the loop
    /// exits; cancellation is only observed at the tick wait.
    pub(crate) async fn run(self) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate first fire so the app gets one full
        // interval before its first probe.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }
        debug!(app = %self.config.id, "checker stopped");
    }

    async fn tick(&self) {
        self.state.write().last_check_ms = self.clock.epoch_ms();

        let command = probe_command(self.config.check, &self.config.target);
        let up = match self.pool.execute(self.config.host, &command).await {
            Ok(stdout) => evaluate(self.config.check, &stdout),
            Err(e) => {
                warn!(app = %self.config.id, host = %self.config.host, error = %e, "probe failed");
                false
            }
        };

        if up {
            let was = self.state.read().last_result;
            if was != AppState::Up {
                self.bus.publish(&StatusEvent::app(self.config.id, true)).await;
                self.state.write().last_result = AppState::Up;
            }
            return;
        }

        self.bus.publish(&StatusEvent::app(self.config.id, false)).await;
        self.state.write().last_result = AppState::Down;

        if self.config.auto_restart {
            match self.pool.execute(self.config.host, &self.config.start_script).await {
                Ok(_) => {
                    debug!(app = %self.config.id, script = %self.config.start_script, "restarted");
                    self.bus.publish(&StatusEvent::app(self.config.id, true)).await;
                    self.state.write().last_result = AppState::Up;
                }
                Err(e) => {
                    // Stay down; the next tick retries.
                    warn!(app = %self.config.id, error = %e, "restart script failed");
                }
            }
        }
    }
}

/// Probe command for a check kind; liveness is inferred from its output.
pub(crate) fn probe_command(kind: CheckKind, target: &str) -> String {
    match kind {
        CheckKind::Process => {
            format!("ps -ef | grep {target} | grep -v grep | awk '{{print $2}}'")
        }
        CheckKind::Port => format!("lsof -i :{target} | grep LISTEN | awk '{{print $2}}'"),
        CheckKind::Http => format!("curl -s -o /dev/null -w '%{{http_code}}' {target}"),
    }
}

/// Interpret probe stdout: pid and port probes are alive on any
/// non-blank output; HTTP probes are alive on a 2xx/3xx status code.
pub(crate) fn evaluate(kind: CheckKind, stdout: &str) -> bool {
    let trimmed = stdout.trim();
    match kind {
        CheckKind::Process | CheckKind::Port => !trimmed.is_empty(),
        CheckKind::Http => matches!(trimmed.chars().next(), Some('2' | '3')),
    }
}

#[cfg(test)]
#[path = "checker_tests.rs"]
mod tests;
