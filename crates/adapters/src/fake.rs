// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable in-memory transport for engine and scenario tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ov_core::{HostConfig, OpsError};
use parking_lot::Mutex;

use crate::session::{SessionHandle, Transport};

/// In-memory transport whose dial, keepalive, and command behavior tests
/// flip at runtime. Sessions opened from one `FakeTransport` share its
/// state, so cutting the link also kills handles that are already open.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    refuse_dials: bool,
    link_down: bool,
    responses: Vec<(String, Result<String, OpsError>)>,
    executed: Vec<String>,
    dials: u32,
    opened: u32,
    closed: u32,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse dial attempts from now on.
    pub fn refuse_dials(&self) {
        self.state.lock().refuse_dials = true;
    }

    pub fn accept_dials(&self) {
        self.state.lock().refuse_dials = false;
    }

    /// Fail keepalives and commands on every open session.
    pub fn cut_link(&self) {
        self.state.lock().link_down = true;
    }

    pub fn restore_link(&self) {
        self.state.lock().link_down = false;
    }

    /// Respond to commands containing `needle` with `stdout`. Earlier
    /// registrations win; unmatched commands return empty stdout.
    pub fn respond(&self, needle: &str, stdout: &str) {
        self.state.lock().responses.push((needle.to_string(), Ok(stdout.to_string())));
    }

    /// Fail commands containing `needle` with `error`.
    pub fn fail_command(&self, needle: &str, error: OpsError) {
        self.state.lock().responses.push((needle.to_string(), Err(error)));
    }

    /// Forget all scripted responses.
    pub fn clear_responses(&self) {
        self.state.lock().responses.clear();
    }

    /// Commands executed across all sessions, oldest first.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    pub fn dial_count(&self) -> u32 {
        self.state.lock().dials
    }

    pub fn opened_count(&self) -> u32 {
        self.state.lock().opened
    }

    pub fn closed_count(&self) -> u32 {
        self.state.lock().closed
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self, config: &HostConfig) -> Result<Arc<dyn SessionHandle>, OpsError> {
        let mut state = self.state.lock();
        state.dials += 1;
        if state.refuse_dials {
            return Err(OpsError::Transport(format!(
                "dial {}: connection refused",
                config.endpoint()
            )));
        }
        state.opened += 1;
        Ok(Arc::new(FakeSession { state: Arc::clone(&self.state) }))
    }
}

struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl SessionHandle for FakeSession {
    async fn execute(&self, command: &str, _timeout: Duration) -> Result<String, OpsError> {
        let mut state = self.state.lock();
        if state.link_down {
            return Err(OpsError::Transport("link down".to_string()));
        }
        state.executed.push(command.to_string());
        for (needle, result) in &state.responses {
            if command.contains(needle.as_str()) {
                return result.clone();
            }
        }
        Ok(String::new())
    }

    async fn keepalive(&self) -> Result<(), OpsError> {
        if self.state.lock().link_down {
            return Err(OpsError::Transport("link down".to_string()));
        }
        Ok(())
    }

    async fn close(&self) {
        self.state.lock().closed += 1;
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
