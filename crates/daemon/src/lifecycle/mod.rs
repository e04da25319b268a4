// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: logging, service construction, shutdown.

mod startup;
pub use startup::{startup, StartupResult};

use std::path::PathBuf;
use std::sync::Arc;

use ov_engine::{CheckerManager, ConnectionPool, EventBus};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    pub pool: Arc<ConnectionPool>,
    pub manager: Arc<CheckerManager>,
    pub bus: EventBus,
    /// Root token; cancels the probe task, checkers, listener, and
    /// subscriber connections.
    pub shutdown: CancellationToken,
    pub socket_path: PathBuf,
}

impl DaemonState {
    /// Cancel background tasks, stop checkers, close sessions, and
    /// remove the socket.
    pub async fn shutdown(&self) {
        info!("shutting down");
        self.shutdown.cancel();
        self.manager.shutdown_all();
        self.pool.close_all().await;
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
        info!("shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("failed to bind subscriber endpoint at {0}: {1}")]
    WsBindFailed(String, std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize tracing. With a log directory, logs go to a daily-rolled
/// file through a non-blocking writer; hold the returned guard for the
/// process lifetime. Without one, logs go to stdout.
pub fn init_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_new(&config.daemon.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    match &config.daemon.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ovd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
