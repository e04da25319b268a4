// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ov_core::{AppConfig, AppId, HostConfig, HostId};
use serde::{Deserialize, Serialize};

/// Request from an operator tool to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,

    /// Register a remote host and connect to it
    HostRegister { host: HostConfig },

    /// Close and remove a host
    HostRemove { id: HostId },

    /// Snapshot of all hosts, local included
    HostList,

    /// Snapshot of one host
    HostGet { id: HostId },

    /// Run a one-off command on a host
    HostExec { id: HostId, command: String },

    /// Register an app and start its watchdog
    AppCreate { app: AppConfig },

    /// Stop and remove an app watchdog
    AppRemove { id: AppId },

    /// Swap an app's config (stop old watchdog, start new)
    AppReplace { app: AppConfig },

    /// Snapshot of all apps
    AppList,

    /// Snapshot of one app
    AppGet { id: AppId },
}
