// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ovd` — the Overseer supervision daemon.

use std::process::ExitCode;

use ov_daemon::config::Config;
use ov_daemon::env;
use ov_daemon::lifecycle::{self, startup, StartupResult};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = env::config_path();
    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ovd: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = lifecycle::init_logging(&config);

    let StartupResult { daemon, listener, ws } = match startup(config).await {
        Ok(result) => result,
        Err(e) => {
            error!("startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(version = env::DAEMON_VERSION, "ovd started");

    let listener_task = tokio::spawn(listener.run());
    let ws_task = tokio::spawn(ws.run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupt received"),
        // An IPC Shutdown request cancels the root token.
        _ = daemon.shutdown.cancelled() => {}
    }

    daemon.shutdown().await;
    let _ = listener_task.await;
    let _ = ws_task.await;
    ExitCode::SUCCESS
}
