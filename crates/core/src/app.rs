// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch configuration for supervised applications.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OpsError;
use crate::id::{AppId, HostId};
use crate::status::{AppState, CheckKind};

/// Configuration of one supervised application: what to watch, how to
/// check it, and how to bring it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub id: AppId,
    pub name: String,
    /// Host the probe and start script run on. May stop resolving later
    /// (host removed); probes then report the app as down.
    pub host: HostId,
    pub check: CheckKind,
    /// Probe target; meaning depends on `check` (process name, port
    /// number, or URL).
    pub target: String,
    pub interval_secs: u64,
    /// Path of the start script on the bound host.
    pub start_script: String,
    pub auto_restart: bool,
}

impl AppConfig {
    /// Reject configs the checker loop cannot honor.
    pub fn validate(&self) -> Result<(), OpsError> {
        if self.interval_secs == 0 {
            return Err(OpsError::InvalidConfig(
                "check interval must be at least 1 second".to_string(),
            ));
        }
        if self.target.is_empty() {
            return Err(OpsError::InvalidConfig("check target must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Point-in-time view of a supervised app, including the last probe
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
    pub id: AppId,
    pub name: String,
    pub host: HostId,
    pub check: CheckKind,
    pub target: String,
    pub interval_secs: u64,
    pub start_script: String,
    pub auto_restart: bool,
    pub last_result: AppState,
    /// Epoch milliseconds of the last probe; 0 when never probed.
    pub last_check_ms: u64,
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
