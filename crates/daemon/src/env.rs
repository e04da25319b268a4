// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Daemon version (from Cargo.toml)
pub const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file: `OV_CONFIG` > ./overseer.toml
pub fn config_path() -> PathBuf {
    std::env::var("OV_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("overseer.toml"))
}

/// Resolve state directory: OV_STATE_DIR > XDG_STATE_HOME/overseer >
/// ~/.local/state/overseer
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("OV_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("overseer"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/overseer"))
}

/// Budget for writing one IPC response (`OV_IPC_TIMEOUT_MS`).
pub fn ipc_timeout() -> Duration {
    std::env::var("OV_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
