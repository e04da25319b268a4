// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status enums for hosts and supervised apps.

use serde::{Deserialize, Serialize};

/// Connection state of a pooled host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectStatus::Connecting => "connecting",
            ConnectStatus::Connected => "connected",
            ConnectStatus::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for ConnectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connecting" => Ok(ConnectStatus::Connecting),
            "connected" => Ok(ConnectStatus::Connected),
            "disconnected" => Ok(ConnectStatus::Disconnected),
            other => Err(format!("unknown connect status: {other}")),
        }
    }
}

/// How an app's liveness is probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    /// `ps` lookup by process name; alive when a pid is printed.
    #[serde(rename = "process-name")]
    Process,
    /// `lsof` lookup for a LISTEN socket on the port.
    #[serde(rename = "listening-port")]
    Port,
    /// HTTP GET; alive on a 2xx/3xx status code.
    #[serde(rename = "http-url")]
    Http,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckKind::Process => "process-name",
            CheckKind::Port => "listening-port",
            CheckKind::Http => "http-url",
        };
        f.write_str(s)
    }
}

/// Last observed liveness of a supervised app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Up,
    Down,
    /// Never probed yet.
    Unknown,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
