// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local executor: commands run as child processes of the supervisor.
//!
//! Same contract as a remote session's `execute`, except stdout and
//! stderr come back combined. There is no link to keep alive, so
//! keepalive trivially succeeds and open/close have no representation.

use std::process::Stdio;
use std::time::Duration;

use ov_core::OpsError;

#[derive(Clone, Copy, Default)]
pub struct LocalExec;

impl LocalExec {
    /// Run `command` through `sh -c`. The child is killed when the
    /// timeout elapses.
    pub async fn execute(&self, command: &str, timeout: Duration) -> Result<String, OpsError> {
        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OpsError::Transport(format!("spawn: {e}")))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| OpsError::Transport(format!("wait: {e}")))?,
            Err(_) => return Err(OpsError::Timeout(timeout)),
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(OpsError::RemoteExec {
                status: output.status.code().unwrap_or(-1),
                stderr: combined,
            });
        }
        Ok(combined)
    }

    pub fn keepalive(&self) -> Result<(), OpsError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
