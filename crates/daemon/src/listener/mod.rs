// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC listener for operator tools.
//!
//! Accepts Unix socket connections and serves requests against the
//! pool, checker manager, and event bus without blocking the engine's
//! background tasks. Connections are handled one task each.

use std::sync::Arc;
use std::time::Instant;

use ov_core::OpsError;
use ov_engine::{CheckerManager, ConnectionPool, EventBus};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env;
use crate::protocol::{self, ProtocolError, Request, Response};

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub pool: Arc<ConnectionPool>,
    pub manager: Arc<CheckerManager>,
    pub bus: EventBus,
    pub start_time: Instant,
    /// Root shutdown token; `Request::Shutdown` cancels it.
    pub shutdown: CancellationToken,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    /// Accept until shutdown, spawning a task per connection.
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => break,
                result = self.socket.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("accept error: {e}"),
                },
            }
        }
        debug!("ipc listener stopped");
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    loop {
        let request = match protocol::read_request(&mut reader).await {
            Ok(request) => request,
            // Client hung up between requests.
            Err(ProtocolError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(())
            }
            Err(e) => return Err(e),
        };

        let shutdown_requested = matches!(request, Request::Shutdown);
        let response = dispatch(request, ctx).await;

        match tokio::time::timeout(
            env::ipc_timeout(),
            protocol::write_response(&mut writer, &response),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!("response write timed out; dropping connection");
                return Ok(());
            }
        }

        if shutdown_requested {
            ctx.shutdown.cancel();
            return Ok(());
        }
    }
}

pub(crate) async fn dispatch(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Ok,

        Request::Hello { version } => {
            debug!(client = %version, "hello");
            Response::Hello { version: env::DAEMON_VERSION.to_string() }
        }

        Request::Status => Response::Status {
            version: env::DAEMON_VERSION.to_string(),
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            hosts: ctx.pool.remote_count(),
            apps: ctx.manager.count(),
            subscribers: ctx.bus.subscriber_count().await,
        },

        Request::Shutdown => {
            info!("shutdown requested over ipc");
            Response::Ok
        }

        Request::HostRegister { host } => match ctx.pool.register(host).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::error(&e),
        },

        Request::HostRemove { id } => {
            ctx.pool.unregister(id).await;
            Response::Ok
        }

        Request::HostList => Response::Hosts { hosts: ctx.pool.list() },

        Request::HostGet { id } => match ctx.pool.get(id) {
            Some(host) => Response::Host { host },
            None => Response::error(&OpsError::host_missing(id)),
        },

        Request::HostExec { id, command } => match ctx.pool.execute(id, &command).await {
            Ok(stdout) => Response::Output { stdout },
            Err(e) => Response::error(&e),
        },

        Request::AppCreate { app } => match ctx.manager.create(app) {
            Ok(()) => Response::Ok,
            Err(e) => Response::error(&e),
        },

        Request::AppRemove { id } => {
            ctx.manager.remove(id);
            Response::Ok
        }

        Request::AppReplace { app } => match ctx.manager.replace(app) {
            Ok(()) => Response::Ok,
            Err(e) => Response::error(&e),
        },

        Request::AppList => Response::Apps { apps: ctx.manager.list() },

        Request::AppGet { id } => match ctx.manager.get(id) {
            Some(app) => Response::App { app },
            None => Response::error(&OpsError::app_missing(id)),
        },
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Io(e) => debug!("connection I/O error: {e}"),
        other => warn!("connection error: {other}"),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
