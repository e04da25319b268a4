// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport seam between the connection pool and concrete executors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ov_core::{HostConfig, OpsError};

/// An authenticated, multiplexed session to one host.
///
/// Each `execute` opens and tears down its own sub-session; a handle
/// carries no per-command state between calls.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Run a shell command and capture stdout. A non-zero exit returns
    /// `OpsError::RemoteExec` carrying stderr; exceeding `timeout`
    /// returns `OpsError::Timeout`.
    async fn execute(&self, command: &str, timeout: Duration) -> Result<String, OpsError>;

    /// Protocol-level no-op requesting a server reply. The pool's
    /// liveness probe.
    async fn keepalive(&self) -> Result<(), OpsError>;

    /// Idempotent release.
    async fn close(&self);
}

/// Dials and authenticates sessions to remote hosts.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, config: &HostConfig) -> Result<Arc<dyn SessionHandle>, OpsError>;
}
