// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH transport backed by libssh2.
//!
//! libssh2 calls are blocking, so every operation runs on tokio's
//! blocking pool with the session timeout bounding individual calls.
//! Host keys are accepted without verification: the fleet is
//! operator-managed, and registration already carries the credential.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ov_core::{Credential, HostConfig, OpsError};
use parking_lot::Mutex;
use tracing::debug;

use crate::session::{SessionHandle, Transport};

/// Extra slack on the outer async timeout so the inner libssh2 timeout
/// (which produces the better error) usually fires first.
const EXEC_GRACE: Duration = Duration::from_secs(2);

/// LIBSSH2_ERROR_TIMEOUT
const LIBSSH2_TIMEOUT: i32 = -9;

pub struct SshTransport {
    dial_timeout: Duration,
}

impl SshTransport {
    pub fn new(dial_timeout: Duration) -> Self {
        Self { dial_timeout }
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn open(&self, config: &HostConfig) -> Result<Arc<dyn SessionHandle>, OpsError> {
        let config = config.clone();
        let dial_timeout = self.dial_timeout;
        let session = tokio::task::spawn_blocking(move || dial(&config, dial_timeout))
            .await
            .map_err(|e| OpsError::Internal(format!("dial task died: {e}")))??;
        Ok(Arc::new(SshSession { session: Arc::new(Mutex::new(session)) }))
    }
}

/// Resolve, connect, handshake, and authenticate.
fn dial(config: &HostConfig, dial_timeout: Duration) -> Result<ssh2::Session, OpsError> {
    let endpoint = config.endpoint();
    let addr = endpoint
        .to_socket_addrs()
        .map_err(|e| OpsError::Transport(format!("resolve {endpoint}: {e}")))?
        .next()
        .ok_or_else(|| OpsError::Transport(format!("resolve {endpoint}: no address")))?;

    let stream = TcpStream::connect_timeout(&addr, dial_timeout).map_err(|e| {
        if e.kind() == std::io::ErrorKind::TimedOut {
            OpsError::Timeout(dial_timeout)
        } else {
            OpsError::Transport(format!("dial {endpoint}: {e}"))
        }
    })?;

    let mut session = ssh2::Session::new().map_err(|e| OpsError::Transport(e.to_string()))?;
    session.set_timeout(dial_timeout.as_millis() as u32);
    session.set_tcp_stream(stream);
    session
        .handshake()
        .map_err(|e| OpsError::Transport(format!("handshake with {endpoint}: {e}")))?;

    authenticate(&session, config)?;

    // Have keepalive no-ops request a server reply so the next probe
    // notices a dead peer.
    session.set_keepalive(true, 1);
    debug!(host = %config.id, endpoint = %endpoint, "ssh session established");
    Ok(session)
}

/// Password goes straight to the transport; key auth tries the key
/// unencrypted first and falls back to the configured passphrase.
fn authenticate(session: &ssh2::Session, config: &HostConfig) -> Result<(), OpsError> {
    match &config.credential {
        Credential::Password { secret } => {
            session.userauth_password(&config.user, secret).map_err(|e| {
                OpsError::AuthFailure(format!("password auth for {}: {e}", config.user))
            })
        }
        Credential::Key { key_path, passphrase } => {
            if std::fs::metadata(key_path).is_err() {
                return Err(OpsError::AuthFailure(format!(
                    "key file {} not readable",
                    key_path.display()
                )));
            }
            match session.userauth_pubkey_file(&config.user, None, key_path, None) {
                Ok(()) => Ok(()),
                Err(first) => match passphrase {
                    Some(phrase) => session
                        .userauth_pubkey_file(&config.user, None, key_path, Some(phrase))
                        .map_err(|e| {
                            OpsError::AuthFailure(format!("key auth for {}: {e}", config.user))
                        }),
                    None => {
                        Err(OpsError::AuthFailure(format!("key auth for {}: {first}", config.user)))
                    }
                },
            }
        }
    }
}

struct SshSession {
    session: Arc<Mutex<ssh2::Session>>,
}

#[async_trait]
impl SessionHandle for SshSession {
    async fn execute(&self, command: &str, timeout: Duration) -> Result<String, OpsError> {
        let session = Arc::clone(&self.session);
        let command = command.to_string();
        let run = tokio::task::spawn_blocking(move || exec(&session, &command, timeout));
        match tokio::time::timeout(timeout + EXEC_GRACE, run).await {
            Ok(joined) => {
                joined.map_err(|e| OpsError::Internal(format!("exec task died: {e}")))?
            }
            Err(_) => Err(OpsError::Timeout(timeout)),
        }
    }

    async fn keepalive(&self) -> Result<(), OpsError> {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            session
                .lock()
                .keepalive_send()
                .map(|_| ())
                .map_err(|e| OpsError::Transport(format!("keepalive: {e}")))
        })
        .await
        .map_err(|e| OpsError::Internal(format!("keepalive task died: {e}")))?
    }

    async fn close(&self) {
        let session = Arc::clone(&self.session);
        let _ = tokio::task::spawn_blocking(move || {
            let _ = session.lock().disconnect(None, "closing", None);
        })
        .await;
    }
}

/// One command over a fresh channel: exec, drain stdout then stderr,
/// wait for close, check the exit status.
fn exec(
    session: &Mutex<ssh2::Session>,
    command: &str,
    timeout: Duration,
) -> Result<String, OpsError> {
    let session = session.lock();
    session.set_timeout(timeout.as_millis() as u32);

    let mut channel = session.channel_session().map_err(|e| map_ssh_err(e, timeout))?;
    channel.exec(command).map_err(|e| map_ssh_err(e, timeout))?;

    let mut stdout = String::new();
    channel
        .read_to_string(&mut stdout)
        .map_err(|e| OpsError::Transport(format!("read stdout: {e}")))?;

    let mut stderr = String::new();
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(|e| OpsError::Transport(format!("read stderr: {e}")))?;

    channel.wait_close().map_err(|e| map_ssh_err(e, timeout))?;
    let status = channel.exit_status().map_err(|e| map_ssh_err(e, timeout))?;
    if status != 0 {
        return Err(OpsError::RemoteExec { status, stderr });
    }
    Ok(stdout)
}

fn map_ssh_err(e: ssh2::Error, timeout: Duration) -> OpsError {
    if matches!(e.code(), ssh2::ErrorCode::Session(LIBSSH2_TIMEOUT)) {
        OpsError::Timeout(timeout)
    } else {
        OpsError::Transport(e.to_string())
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
