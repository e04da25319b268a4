// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: construct the engine services and bind the sockets.

use std::sync::Arc;
use std::time::Instant;

use ov_adapters::SshTransport;
use ov_core::SystemClock;
use ov_engine::{CheckerManager, ConnectionPool, EventBus};
use tokio::net::{TcpListener, UnixListener};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{DaemonState, LifecycleError};
use crate::config::Config;
use crate::env;
use crate::listener::{ListenCtx, Listener};
use crate::ws::{WsConfig, WsServer};

/// Everything `main` needs: the daemon state plus the two accept loops
/// to spawn.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: Listener,
    pub ws: WsServer,
}

/// Construct the pool, checker manager, and event bus; start the probe
/// task; bind the IPC socket and the subscriber endpoint.
///
/// Hosts and apps are registered at runtime over IPC; persistence of
/// their configuration belongs to an outer layer.
pub async fn startup(config: Config) -> Result<StartupResult, LifecycleError> {
    let shutdown = CancellationToken::new();

    let bus = EventBus::new(config.write_timeout());
    let transport = Arc::new(SshTransport::new(config.pool_config().dial_timeout));
    let pool = Arc::new(ConnectionPool::new(
        transport,
        bus.clone(),
        config.pool_config(),
        SystemClock,
    ));
    pool.spawn_probe(shutdown.child_token());
    let manager = Arc::new(CheckerManager::new(
        Arc::clone(&pool),
        bus.clone(),
        SystemClock,
        shutdown.child_token(),
    ));

    // IPC socket: remove a stale file from a previous run, then bind.
    let socket_path = match &config.daemon.socket_path {
        Some(path) => path.clone(),
        None => env::state_dir()?.join("overseerd.sock"),
    };
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let socket = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.clone(), e))?;
    info!(path = %socket_path.display(), "ipc socket bound");

    let ctx = Arc::new(ListenCtx {
        pool: Arc::clone(&pool),
        manager: Arc::clone(&manager),
        bus: bus.clone(),
        start_time: Instant::now(),
        shutdown: shutdown.clone(),
    });
    let listener = Listener::new(socket, ctx);

    // Subscriber endpoint.
    let ws_listener = TcpListener::bind(&config.daemon.ws_listen)
        .await
        .map_err(|e| LifecycleError::WsBindFailed(config.daemon.ws_listen.clone(), e))?;
    info!(addr = %config.daemon.ws_listen, "subscriber endpoint bound");
    let ws_config = WsConfig { heartbeat: config.heartbeat(), read_deadline: config.read_deadline() };
    let ws = WsServer::new(ws_listener, bus.clone(), ws_config, shutdown.clone());

    let daemon = DaemonState { config, pool, manager, bus, shutdown, socket_path };
    Ok(StartupResult { daemon, listener, ws })
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
