// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host registration config and pool snapshots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::id::HostId;
use crate::status::ConnectStatus;

/// Credential used to authenticate a shell session to a host.
///
/// Secrets live here in memory for the process lifetime; encrypting them
/// at rest is the persistence collaborator's problem, not ours.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Credential {
    /// Password authentication.
    Password { secret: String },
    /// Private-key authentication. The key material is read from
    /// `key_path`; `passphrase` is tried only after an unencrypted parse
    /// fails.
    Key {
        key_path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        passphrase: Option<String>,
    },
}

impl Credential {
    /// Short tag for logs and snapshots. Never exposes secret material.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Password { .. } => "password",
            Credential::Key { .. } => "key",
        }
    }
}

// Hand-written so a stray `{:?}` in a log line can't leak a secret.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password { .. } => f.write_str("Credential::Password(..)"),
            Credential::Key { key_path, .. } => {
                write!(f, "Credential::Key({})", key_path.display())
            }
        }
    }
}

/// Registration config for a remote host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    pub id: HostId,
    pub addr: String,
    pub port: u16,
    pub user: String,
    pub credential: Credential,
}

impl HostConfig {
    /// `addr:port` dial string.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Point-in-time view of a pooled host. Safe to hand to callers: carries
/// no credential and no session handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub id: HostId,
    pub addr: String,
    pub port: u16,
    pub user: String,
    /// Credential kind tag ("password", "key", or "local").
    pub auth: String,
    pub status: ConnectStatus,
    /// Epoch milliseconds of the last liveness probe; 0 when never probed.
    pub last_check_ms: u64,
}

impl HostSnapshot {
    /// The singleton local pseudo-host entry: permanently connected,
    /// no endpoint, no credential.
    pub fn local(now_ms: u64) -> Self {
        Self {
            id: HostId::LOCAL,
            addr: "localhost".to_string(),
            port: 0,
            user: String::new(),
            auth: "local".to_string(),
            status: ConnectStatus::Connected,
            last_check_ms: now_ms,
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
