// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ov_core::{AppSnapshot, HostSnapshot, OpsError};
use serde::{Deserialize, Serialize};

/// Response from the daemon to an operator tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,

    Hello { version: String },

    Status { version: String, uptime_secs: u64, hosts: usize, apps: usize, subscribers: usize },

    Hosts { hosts: Vec<HostSnapshot> },

    Host { host: HostSnapshot },

    Apps { apps: Vec<AppSnapshot> },

    App { app: AppSnapshot },

    /// Captured stdout of a `HostExec`
    Output { stdout: String },

    Error { code: u32, message: String },
}

impl Response {
    pub fn error(err: &OpsError) -> Self {
        Response::Error { code: error_code(err), message: err.to_string() }
    }
}

/// Service error codes carried to operator tools: 10000 unknown,
/// 10001 parameter, 10002 auth, 10004 connect, 10005 target not found.
fn error_code(err: &OpsError) -> u32 {
    match err {
        OpsError::InvalidConfig(_) | OpsError::AlreadyPresent { .. } => 10001,
        OpsError::AuthFailure(_) => 10002,
        OpsError::CapacityExceeded { .. } | OpsError::Transport(_) | OpsError::Timeout(_) => 10004,
        OpsError::NotFound { .. } => 10005,
        OpsError::RemoteExec { .. } | OpsError::Internal(_) => 10000,
    }
}
