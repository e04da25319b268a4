// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the transport adapters and the engine.
//!
//! The variants carry strings rather than source errors so values stay
//! `Clone + PartialEq`; transport adapters stringify the underlying
//! library error at the boundary.

use std::time::Duration;

use thiserror::Error;

use crate::id::{AppId, HostId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// The pool is at its configured capacity.
    #[error("connection pool full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("{kind} {id} already exists")]
    AlreadyPresent { kind: &'static str, id: u64 },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Credential parse failed or the server rejected authentication.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Dial, keepalive, session, or I/O failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A dial or command exceeded its budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The command ran but exited non-zero; carries captured stderr.
    #[error("command exited with status {status}: {stderr}")]
    RemoteExec { status: i32, stderr: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Precondition violation or programmer error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OpsError {
    pub fn host_exists(id: HostId) -> Self {
        OpsError::AlreadyPresent { kind: "host", id: id.0 }
    }

    pub fn host_missing(id: HostId) -> Self {
        OpsError::NotFound { kind: "host", id: id.0 }
    }

    pub fn app_exists(id: AppId) -> Self {
        OpsError::AlreadyPresent { kind: "app", id: id.0 }
    }

    pub fn app_missing(id: AppId) -> Self {
        OpsError::NotFound { kind: "app", id: id.0 }
    }

    /// The pool holds no live session for the host.
    pub fn not_connected(id: HostId) -> Self {
        OpsError::Transport(format!("host {id} not connected"))
    }
}
